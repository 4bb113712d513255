//! Transaction validity window.

use substrpc_codec::error::DecodeError;

/// How long a signed extrinsic stays valid.
///
/// A mortal era is valid for `period` blocks starting at the first block
/// whose number is `phase` modulo `period`. The signature commits to the
/// hash of that starting (checkpoint) block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Era {
    #[default]
    Immortal,
    Mortal { period: u64, phase: u64 },
}

impl Era {
    /// Mortal era of roughly `period` blocks starting at block `current`.
    ///
    /// The period is rounded up to a power of two in `4..=65536`; the phase
    /// is quantized so that it fits the two-byte encoding.
    pub fn mortal(period: u64, current: u64) -> Self {
        let period = period
            .checked_next_power_of_two()
            .unwrap_or(1 << 16)
            .clamp(4, 1 << 16);
        let phase = current % period;
        let quantize_factor = (period >> 12).max(1);
        Self::Mortal { period, phase: phase / quantize_factor * quantize_factor }
    }

    pub fn is_immortal(&self) -> bool {
        matches!(self, Self::Immortal)
    }

    /// First block of the validity window that contains `current`.
    /// A zero period has no window and is treated as immortal.
    pub fn birth(&self, current: u64) -> u64 {
        match *self {
            Self::Immortal | Self::Mortal { period: 0, .. } => 0,
            Self::Mortal { period, phase } => (current.max(phase) - phase) / period * period + phase,
        }
    }

    /// First block at which the extrinsic is no longer valid.
    pub fn death(&self, current: u64) -> u64 {
        match *self {
            Self::Immortal | Self::Mortal { period: 0, .. } => u64::MAX,
            Self::Mortal { period, .. } => self.birth(current).saturating_add(period),
        }
    }

    pub fn encode_to(&self, out: &mut Vec<u8>) {
        match *self {
            Self::Immortal => out.push(0),
            Self::Mortal { period, phase } => {
                let quantize_factor = (period >> 12).max(1);
                let low = (period.trailing_zeros().saturating_sub(1)).clamp(1, 15) as u16;
                let encoded = low | (((phase / quantize_factor) as u16) << 4);
                out.extend_from_slice(&encoded.to_le_bytes());
            }
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(2);
        self.encode_to(&mut out);
        out
    }

    /// Decode an era from the front of `bytes`; returns it with the number of
    /// bytes read.
    pub fn decode_prefix(bytes: &[u8]) -> Result<(Self, usize), DecodeError> {
        let first = *bytes.first().ok_or(DecodeError::UnexpectedEof { needed: 1, available: 0 })?;
        if first == 0 {
            return Ok((Self::Immortal, 1));
        }
        let second = *bytes.get(1).ok_or(DecodeError::UnexpectedEof { needed: 2, available: 1 })?;
        let encoded = u64::from(u16::from_le_bytes([first, second]));
        let period = 2u64 << (encoded % (1 << 4));
        let quantize_factor = (period >> 12).max(1);
        let phase = (encoded >> 4) * quantize_factor;
        if period >= 4 && phase < period {
            Ok((Self::Mortal { period, phase }, 2))
        } else {
            Err(DecodeError::InvalidVariant { tag: first, ty: "Era".into() })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn immortal_is_single_zero_byte() {
        assert_eq!(Era::Immortal.encode(), vec![0]);
        assert_eq!(Era::decode_prefix(&[0, 0xff]).unwrap(), (Era::Immortal, 1));
    }

    #[test]
    fn mortal_period_64() {
        let era = Era::mortal(64, 42);
        assert_eq!(era, Era::Mortal { period: 64, phase: 42 });
        // trailing_zeros(64) - 1 = 5, phase 42 << 4 = 672
        assert_eq!(era.encode(), vec![0xa5, 0x02]);
        assert_eq!(Era::decode_prefix(&era.encode()).unwrap(), (era, 2));
    }

    #[test]
    fn long_period_is_quantized() {
        let era = Era::mortal(32768, 20_000);
        assert_eq!(era, Era::Mortal { period: 32768, phase: 20_000 });
        assert_eq!(era.encode(), vec![78u8, 156]);
        assert_eq!(Era::decode_prefix(&era.encode()).unwrap().0, era);
    }

    #[test]
    fn period_is_rounded_and_clamped() {
        assert_eq!(Era::mortal(1, 0), Era::Mortal { period: 4, phase: 0 });
        assert_eq!(Era::mortal(100, 0), Era::Mortal { period: 128, phase: 0 });
        assert_eq!(Era::mortal(1 << 20, 0), Era::Mortal { period: 1 << 16, phase: 0 });
    }

    #[test]
    fn birth_and_death() {
        let era = Era::mortal(64, 42);
        assert_eq!(era.birth(42), 42);
        assert_eq!(era.birth(105), 42);
        assert_eq!(era.birth(106), 106);
        assert_eq!(era.death(42), 106);
        // a freshly built era starts at the block it was built on
        assert_eq!(Era::mortal(64, 1_000).birth(1_000), 1_000);
    }

    #[test]
    fn zero_period_does_not_panic() {
        let era = Era::Mortal { period: 0, phase: 0 };
        assert_eq!(era.birth(1_000), 0);
        assert_eq!(era.death(1_000), u64::MAX);
        assert_eq!(Era::Mortal { period: 64, phase: 0 }.death(u64::MAX), u64::MAX);
    }

    #[test]
    fn truncated_mortal_rejected() {
        assert!(Era::decode_prefix(&[0xa5]).is_err());
    }
}
