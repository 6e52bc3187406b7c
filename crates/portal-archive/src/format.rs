/// Local file header, the first bytes of any non-empty zip.
const LOCAL_FILE_HEADER: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];
/// End of central directory, the only record in an empty zip.
const END_OF_CENTRAL_DIR: [u8; 4] = [0x50, 0x4B, 0x05, 0x06];

/// Returns `true` if `data` starts with a zip signature.
pub fn is_zip(data: &[u8]) -> bool {
    data.starts_with(&LOCAL_FILE_HEADER) || data.starts_with(&END_OF_CENTRAL_DIR)
}
