#![allow(dead_code)]

/// Header dictionary as numpy writes it for a C-order array.
pub fn dict(descr: &str, shape: &str) -> String {
    format!("{{'descr': '{descr}', 'fortran_order': False, 'shape': {shape}, }}")
}

/// Builds a version 1.0 `.npy` file padded like numpy does, to a multiple of
/// 64 bytes with spaces and a final newline.
pub fn npy_bytes(dict: &str, payload: &[u8]) -> Vec<u8> {
    let total = (10 + dict.len() + 1).div_ceil(64) * 64;
    let header_len = u16::try_from(total - 10).unwrap();
    let mut out = b"\x93NUMPY\x01\x00".to_vec();
    out.extend_from_slice(&header_len.to_le_bytes());
    out.extend_from_slice(dict.as_bytes());
    out.resize(total - 1, b' ');
    out.push(b'\n');
    out.extend_from_slice(payload);
    out
}

/// `np.arange(6, dtype='<f4').reshape(2, 3)`
pub fn f4_2x3() -> Vec<u8> {
    let payload: Vec<u8> = (0..6).flat_map(|i| (i as f32).to_le_bytes()).collect();
    npy_bytes(&dict("<f4", "(2, 3)"), &payload)
}
