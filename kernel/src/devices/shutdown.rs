// We configured this by running QEMU with `-device isa-debug-exit,iobase=0xf4,iosize=0x04`.
const ISA_DEBUG_EXIT_PORT: u16 = 0xf4;

// We use 0x31 as the exit code.
const ISA_DEBUG_EXIT_CODE_SUCCESS: u8 = 0x31;

// Written on test failure, distinct from the success code above so the test
// runner on the host side can tell the two apart.
const ISA_DEBUG_EXIT_CODE_FAILURE: u8 = 0x42;

/// Powers down the machine we're running on,
/// as long as we're running on QEMU.
pub fn power_off() -> ! {
    exit(ISA_DEBUG_EXIT_CODE_SUCCESS)
}

/// Like [`power_off`], but signals to the host-side test runner that the
/// test failed.
pub fn power_off_with_failure() -> ! {
    exit(ISA_DEBUG_EXIT_CODE_FAILURE)
}

fn exit(code: u8) -> ! {
    let mut port = x86_64::instructions::port::Port::new(ISA_DEBUG_EXIT_PORT);
    unsafe {
        port.write(code);
    }

    // If we're not running on QEMU, we'll just loop forever.
    loop {
        x86_64::instructions::hlt();
    }
}
