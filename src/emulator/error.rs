use std::fmt;
use thiserror::Error;

/// Reasons a program could not be loaded.
/// The emulator is left freshly reset when any of these are returned.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum LoadError {
    #[error("program is too large ({size} bytes), max size is {max} bytes")]
    RomTooLarge { size: usize, max: usize },

    #[error("program is empty")]
    EmptyProgram,
}

/// Something went wrong while executing an instruction.
/// Faults never stop the emulator, the offending instruction is skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    StackOverflow { pc: u16 },
    StackUnderflow { pc: u16 },
    UnknownOpcode { pc: u16, opcode: u16 },
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fault::StackOverflow { pc } => write!(f, "stack overflow at {:#05x}", pc),
            Fault::StackUnderflow { pc } => write!(f, "stack underflow at {:#05x}", pc),
            Fault::UnknownOpcode { pc, opcode } => {
                write!(f, "unknown opcode {:#06x} at {:#05x}", opcode, pc)
            }
        }
    }
}

/// Running tally of faults seen since the last reset.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FaultLog {
    pub stack_overflows: u32,
    pub stack_underflows: u32,
    pub unknown_opcodes: u32,
    pub last: Option<Fault>,
}

impl FaultLog {
    pub fn record(&mut self, fault: Fault) {
        let counter = match fault {
            Fault::StackOverflow { .. } => &mut self.stack_overflows,
            Fault::StackUnderflow { .. } => &mut self.stack_underflows,
            Fault::UnknownOpcode { .. } => &mut self.unknown_opcodes,
        };
        *counter = counter.saturating_add(1);
        self.last = Some(fault);
    }

    pub fn total(&self) -> u32 {
        self.stack_overflows
            .saturating_add(self.stack_underflows)
            .saturating_add(self.unknown_opcodes)
    }

    pub fn is_empty(&self) -> bool {
        self.last.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_counts_per_kind() {
        let mut log = FaultLog::default();
        assert!(log.is_empty());

        log.record(Fault::StackOverflow { pc: 0x200 });
        log.record(Fault::UnknownOpcode { pc: 0x202, opcode: 0xFFFF });
        log.record(Fault::UnknownOpcode { pc: 0x204, opcode: 0x5121 });

        assert_eq!(1, log.stack_overflows);
        assert_eq!(0, log.stack_underflows);
        assert_eq!(2, log.unknown_opcodes);
        assert_eq!(3, log.total());
        assert_eq!(Some(Fault::UnknownOpcode { pc: 0x204, opcode: 0x5121 }), log.last);
    }

    #[test]
    fn messages() {
        let err = LoadError::RomTooLarge { size: 3585, max: 3584 };
        assert_eq!("program is too large (3585 bytes), max size is 3584 bytes", err.to_string());
        let fault = Fault::UnknownOpcode { pc: 0x200, opcode: 0xFFFF };
        assert_eq!("unknown opcode 0xffff at 0x200", fault.to_string());
    }
}
