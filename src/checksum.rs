/// Computes the ICMP checksum of `bytes`.
///
/// Words are summed little-endian and the folded, complemented result is
/// returned byte-swapped. Written big-endian, the returned value gives the
/// checksum bytes in wire order.
pub fn checksum(bytes: &[u8]) -> u16 {
    let mut sum: u32 = 0;
    let mut words = bytes.chunks_exact(2);
    for word in &mut words {
        sum = sum.wrapping_add(u32::from(word[1]) << 8 | u32::from(word[0]));
    }
    if let [last] = words.remainder() {
        sum = sum.wrapping_add(u32::from(*last));
    }

    sum = (sum >> 16) + (sum & 0xffff);
    sum += sum >> 16;
    let answer = !sum as u16;
    answer.swap_bytes()
}
