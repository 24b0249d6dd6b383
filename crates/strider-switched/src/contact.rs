//! Contact flags and their mode-number encoding.
//!
//! A mode number packs the four stance flags into bits, left-front being the
//! most significant: `LF = 8, RF = 4, LH = 2, RH = 1`. Mode `15` is full
//! stance, `0` is flight.

use strider_core::ValidationError;

use crate::state::NUM_CONTACT_POINTS;

/// Stance flag per leg, ordered `[LF, RF, LH, RH]`.
pub type ContactFlags = [bool; NUM_CONTACT_POINTS];

pub const LF: usize = 0;
pub const RF: usize = 1;
pub const LH: usize = 2;
pub const RH: usize = 3;

pub mod mode {
    pub const FLY: usize = 0;
    pub const RH: usize = 1;
    pub const LH: usize = 2;
    pub const LH_RH: usize = 3;
    pub const RF: usize = 4;
    pub const RF_RH: usize = 5;
    /// Trot diagonal right-front / left-hind.
    pub const RF_LH: usize = 6;
    pub const RF_LH_RH: usize = 7;
    pub const LF: usize = 8;
    /// Trot diagonal left-front / right-hind.
    pub const LF_RH: usize = 9;
    pub const LF_LH: usize = 10;
    pub const LF_LH_RH: usize = 11;
    pub const LF_RF: usize = 12;
    pub const LF_RF_RH: usize = 13;
    pub const LF_RF_LH: usize = 14;
    pub const STANCE: usize = 15;
}

const fn leg_bit(leg: usize) -> usize {
    1 << (NUM_CONTACT_POINTS - 1 - leg)
}

pub fn mode_number_to_contact_flags(mode: usize) -> Result<ContactFlags, ValidationError> {
    if mode > mode::STANCE {
        return Err(ValidationError::InvalidModeNumber { mode });
    }
    let mut flags = [false; NUM_CONTACT_POINTS];
    for (leg, flag) in flags.iter_mut().enumerate() {
        *flag = mode & leg_bit(leg) != 0;
    }
    Ok(flags)
}

pub fn contact_flags_to_mode_number(flags: &ContactFlags) -> usize {
    flags
        .iter()
        .enumerate()
        .filter(|&(_, &in_contact)| in_contact)
        .map(|(leg, _)| leg_bit(leg))
        .sum()
}

pub fn num_stance_legs(flags: &ContactFlags) -> usize {
    flags.iter().filter(|&&in_contact| in_contact).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_modes() {
        assert_eq!(mode_number_to_contact_flags(mode::STANCE).unwrap(), [true; 4]);
        assert_eq!(mode_number_to_contact_flags(mode::FLY).unwrap(), [false; 4]);
        assert_eq!(
            mode_number_to_contact_flags(mode::LF_RH).unwrap(),
            [true, false, false, true]
        );
        assert_eq!(
            mode_number_to_contact_flags(mode::RF_LH).unwrap(),
            [false, true, true, false]
        );
    }

    #[test]
    fn round_trip_all_modes() {
        for m in 0..=mode::STANCE {
            let flags = mode_number_to_contact_flags(m).unwrap();
            assert_eq!(contact_flags_to_mode_number(&flags), m);
        }
    }

    #[test]
    fn rejects_out_of_range_mode() {
        assert_eq!(
            mode_number_to_contact_flags(16),
            Err(ValidationError::InvalidModeNumber { mode: 16 })
        );
    }

    #[test]
    fn counts_stance_legs() {
        assert_eq!(num_stance_legs(&[true, false, true, true]), 3);
        assert_eq!(num_stance_legs(&[false; 4]), 0);
        let mut flags = [false; 4];
        flags[LH] = true;
        flags[RF] = true;
        assert_eq!(contact_flags_to_mode_number(&flags), mode::RF_LH);
        assert!(!flags[LF] && !flags[RH]);
    }
}
