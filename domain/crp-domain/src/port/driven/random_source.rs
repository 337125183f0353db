//! 乱数ポート

/// 乱数生成ポート（アダプタ実装）。
/// 暗号用途ではないが、呼び出しごとに独立していること。
pub trait RandomSource {
    fn fill_bytes(&self, buf: &mut [u8]);

    fn next_u64(&self) -> u64 {
        let mut buf = [0u8; 8];
        self.fill_bytes(&mut buf);
        u64::from_le_bytes(buf)
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &R {
    fn fill_bytes(&self, buf: &mut [u8]) {
        (**self).fill_bytes(buf)
    }

    fn next_u64(&self) -> u64 {
        (**self).next_u64()
    }
}
