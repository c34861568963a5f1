//! Text protocol result set decoding
//!
//! Each column of a text protocol row is a length-encoded string, with
//! 0xFB standing for NULL.

/// Read a length-encoded integer, returning (value, bytes consumed)
pub fn read_length_encoded_int(data: &[u8]) -> Option<(u64, usize)> {
    let first = *data.first()?;
    match first {
        0x00..=0xFA => Some((first as u64, 1)),
        0xFC if data.len() >= 3 => Some((u16::from_le_bytes([data[1], data[2]]) as u64, 3)),
        0xFD if data.len() >= 4 => Some((
            u32::from_le_bytes([data[1], data[2], data[3], 0]) as u64,
            4,
        )),
        0xFE if data.len() >= 9 => Some((
            u64::from_le_bytes([
                data[1], data[2], data[3], data[4], data[5], data[6], data[7], data[8],
            ]),
            9,
        )),
        _ => None,
    }
}

/// Parse the column count packet that opens a result set
pub fn parse_column_count(payload: &[u8]) -> Option<usize> {
    read_length_encoded_int(payload).map(|(count, _)| count as usize)
}

/// Parse a text protocol row into its column values
///
/// Returns None when the row is truncated or malformed.
pub fn parse_row(data: &[u8], column_count: usize) -> Option<Vec<Option<String>>> {
    let mut values = Vec::with_capacity(column_count);
    let mut offset = 0;

    for _ in 0..column_count {
        if data.get(offset) == Some(&0xFB) {
            values.push(None);
            offset += 1;
            continue;
        }

        let (len, header) = read_length_encoded_int(&data[offset.min(data.len())..])?;
        let start = offset + header;
        let end = start.checked_add(len as usize)?;
        if end > data.len() {
            return None;
        }

        values.push(Some(String::from_utf8_lossy(&data[start..end]).into_owned()));
        offset = end;
    }

    Some(values)
}
