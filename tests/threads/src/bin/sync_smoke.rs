#![no_std]
#![no_main]

use kernel::threads::{Lock, Semaphore};

static TEST_NAME: &str = "sync_smoke";

fn kernel_main(boot_info: &'static mut bootloader_api::BootInfo) -> ! {
    kernel::init(boot_info);

    // Non-blocking surface only: the scheduler this subsystem hands off to
    // (`block_current_thread`, `unblock`, the preemption hook `up`/`release`
    // invoke on every wakeup) isn't implemented yet, so nothing here may
    // actually park or wake a thread.
    let lock = Lock::new();
    assert!(lock.try_acquire());
    assert!(lock.held_by_current_thread());
    assert!(!Lock::new().held_by_current_thread());

    let semaphore = Semaphore::new(1);
    assert_eq!(semaphore.value(), 1);
    assert!(semaphore.try_down());
    assert_eq!(semaphore.value(), 0);
    assert!(!semaphore.try_down());

    kernel_test::pass!(TEST_NAME);

    kernel::devices::shutdown::power_off();
}

kernel::entry_point!(kernel_main);

#[cfg(not(test))]
#[panic_handler]
fn panic(info: &core::panic::PanicInfo) -> ! {
    kernel::println!("{info}");
    kernel::devices::shutdown::power_off_with_failure()
}
