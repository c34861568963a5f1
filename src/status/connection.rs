use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_util::codec::Framed;
use tracing::{debug, error};

use crate::config::ProbeConfig;
use crate::protocol::resultset::{parse_column_count, parse_row};
use crate::protocol::{
    capabilities, compute_auth_response, is_eof_packet, is_err_packet, is_ok_packet,
    AuthSwitchRequest, Command, ErrPacket, HandshakeResponse, InitialHandshake, Packet,
    PacketCodec, NATIVE_PASSWORD_PLUGIN,
};

/// One text protocol result row
pub type Row = Vec<Option<String>>;

/// A single client connection to the probed node
pub struct StatusConnection {
    framed: Framed<TcpStream, PacketCodec>,
    server_version: String,
}

impl StatusConnection {
    /// Connect and authenticate with mysql_native_password
    pub async fn connect(config: &ProbeConfig) -> Result<Self, ConnectionError> {
        let addr = config.addr();
        debug!(addr = %addr, "Connecting to node");

        let stream = TcpStream::connect(&addr).await.map_err(|e| {
            error!(addr = %addr, error = %e, "Failed to connect to node");
            ConnectionError::Connect(e.to_string())
        })?;

        let mut conn = Self {
            framed: Framed::new(stream, PacketCodec),
            server_version: String::new(),
        };

        let handshake_packet = conn.recv().await?;
        if is_err_packet(&handshake_packet.payload) {
            // e.g. "Host is blocked" before any handshake
            return Err(ConnectionError::Connect(err_message(&handshake_packet)));
        }

        let handshake = InitialHandshake::parse(&handshake_packet.payload)
            .ok_or_else(|| ConnectionError::Protocol("Invalid server handshake".into()))?;

        debug!(
            server_version = %handshake.server_version,
            connection_id = handshake.connection_id,
            auth_plugin = %handshake.auth_plugin_name,
            "Received server handshake"
        );

        if handshake.capability_flags & capabilities::CLIENT_PROTOCOL_41 == 0 {
            return Err(ConnectionError::Protocol(
                "Server does not support protocol 4.1".into(),
            ));
        }

        let caps = capabilities::CLIENT_CAPABILITIES & handshake.capability_flags;
        let response = HandshakeResponse {
            capability_flags: caps,
            max_packet_size: 16 * 1024 * 1024,
            character_set: 0x21, // utf8_general_ci
            username: config.username.clone(),
            auth_response: compute_auth_response(&config.password, &handshake.auth_plugin_data()),
            auth_plugin_name: NATIVE_PASSWORD_PLUGIN.to_string(),
        };

        conn.send(response.encode(handshake_packet.sequence_id.wrapping_add(1)))
            .await?;

        let mut reply = conn.recv().await?;

        if reply.payload.first() == Some(&0xFE) {
            let switch = AuthSwitchRequest::parse(&reply.payload)
                .ok_or_else(|| ConnectionError::Protocol("Invalid auth switch request".into()))?;
            if switch.plugin_name != NATIVE_PASSWORD_PLUGIN {
                return Err(ConnectionError::Auth(format!(
                    "unsupported authentication plugin '{}'",
                    switch.plugin_name
                )));
            }
            debug!("Server requested auth switch to mysql_native_password");

            let auth = compute_auth_response(&config.password, &switch.plugin_data);
            conn.send(Packet::new(reply.sequence_id.wrapping_add(1), auth))
                .await?;
            reply = conn.recv().await?;
        }

        if is_err_packet(&reply.payload) {
            let message = err_message(&reply);
            error!(addr = %addr, error = %message, "Authentication failed");
            return Err(ConnectionError::Auth(message));
        }

        if !is_ok_packet(&reply.payload) {
            return Err(ConnectionError::Protocol(
                "Expected OK packet after authentication".into(),
            ));
        }

        debug!(addr = %addr, "Authentication successful");
        conn.server_version = handshake.server_version;
        Ok(conn)
    }

    /// Version string announced by the server
    pub fn server_version(&self) -> &str {
        &self.server_version
    }

    /// Run a text protocol query and collect every row
    pub async fn query(&mut self, sql: &str) -> Result<Vec<Row>, ConnectionError> {
        debug!(sql = %sql, "Executing query");
        self.send(Packet::command(Command::Query, sql.as_bytes()))
            .await?;

        let first = self.recv().await?;
        if is_err_packet(&first.payload) {
            return Err(ConnectionError::Query(err_message(&first)));
        }
        if is_ok_packet(&first.payload) {
            // Statement without a result set
            return Ok(Vec::new());
        }

        let column_count = parse_column_count(&first.payload)
            .filter(|&count| count > 0)
            .ok_or_else(|| ConnectionError::Protocol("Invalid column count".into()))?;

        for _ in 0..column_count {
            self.recv().await?;
        }

        let eof = self.recv().await?;
        if !is_eof_packet(&eof.payload) {
            return Err(ConnectionError::Protocol(
                "Expected EOF after column definitions".into(),
            ));
        }

        let mut rows = Vec::new();
        loop {
            let packet = self.recv().await?;
            if is_eof_packet(&packet.payload) {
                break;
            }
            if is_err_packet(&packet.payload) {
                return Err(ConnectionError::Query(err_message(&packet)));
            }
            let row = parse_row(&packet.payload, column_count)
                .ok_or_else(|| ConnectionError::Protocol("Malformed result row".into()))?;
            rows.push(row);
        }

        debug!(sql = %sql, rows = rows.len(), "Query complete");
        Ok(rows)
    }

    /// Tell the server we are done; the socket closes on drop
    pub async fn quit(mut self) {
        if let Err(e) = self.send(Packet::command(Command::Quit, &[])).await {
            debug!(error = %e, "Failed to send COM_QUIT");
        }
    }

    async fn send(&mut self, packet: Packet) -> Result<(), ConnectionError> {
        self.framed
            .send(packet)
            .await
            .map_err(|e| ConnectionError::Io(e.to_string()))
    }

    async fn recv(&mut self) -> Result<Packet, ConnectionError> {
        match self.framed.next().await {
            Some(Ok(packet)) => Ok(packet),
            Some(Err(e)) => Err(ConnectionError::Io(e.to_string())),
            None => Err(ConnectionError::Disconnected),
        }
    }
}

fn err_message(packet: &Packet) -> String {
    ErrPacket::parse(&packet.payload)
        .map(|err| err.to_string())
        .unwrap_or_else(|| "Unknown server error".to_string())
}

/// Connection errors
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Connection disconnected")]
    Disconnected,
}
