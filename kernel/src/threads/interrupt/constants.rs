/// Vector number at which the PIC's external interrupts begin, after being
/// remapped away from the CPU exception range (0..32).
pub const EXTERNAL_INTERRUPT_OFFSET: u8 = 0x20;
