pub mod codec;
pub mod handshake;
pub mod packet;
pub mod resultset;

pub use codec::PacketCodec;
pub use handshake::{
    compute_auth_response, is_eof_packet, is_err_packet, is_ok_packet, AuthSwitchRequest,
    ErrPacket, HandshakeResponse, InitialHandshake, NATIVE_PASSWORD_PLUGIN,
};
pub use packet::{capabilities, Command, Packet};
