use kernel::devices::timer;

/// Prints the banner for a `sleep` test. Kept separate from [`sleep`] so a
/// caller that wants to drive the threads itself can still reuse the
/// standard description.
#[macro_export]
macro_rules! test_sleep {
    ($thread_cnt:expr, $iterations:expr) => {
        kernel_test::msg!(
            "Creating {} threads to sleep {} times each.",
            $thread_cnt,
            $iterations
        );
        kernel_test::msg!("Thread 0 sleeps 10 ticks each time,");
        kernel_test::msg!("thread 1 sleeps 20 ticks each time, and so on.");
        kernel_test::msg!("If successful, product of each iteration count and");
        kernel_test::msg!("sleep duration will appear in nondescending order.");
    };
}

/// Base sleep duration, in ticks, for the first of the simulated threads.
const BASE_SLEEP_TICKS: usize = 10;

/// Runs the "wake up in priority-free FIFO order" scenario: `thread_cnt`
/// threads each sleep `iterations` times, for increasing multiples of
/// [`BASE_SLEEP_TICKS`].
///
/// `thread_create` does not exist in this kernel yet, so the `thread_cnt`
/// participants are simulated sequentially on the calling thread rather than
/// concurrently. This still exercises [`timer::sleep`], but the ordering
/// property the scenario is named for can only be checked for real once a
/// scheduler capable of running multiple threads exists.
pub fn sleep(test_name: &str, thread_cnt: usize, iterations: usize) {
    kernel::println!(
        "({test_name}) Creating {thread_cnt} threads to sleep {iterations} times each."
    );
    kernel::println!("({test_name}) Thread 0 sleeps 10 ticks each time,");
    kernel::println!("({test_name}) thread 1 sleeps 20 ticks each time, and so on.");
    kernel::println!("({test_name}) If successful, product of each iteration count and");
    kernel::println!("({test_name}) sleep duration will appear in nondescending order.");

    for iteration in 0..iterations {
        for thread in 0..thread_cnt {
            timer::sleep(BASE_SLEEP_TICKS * (thread + 1));
            kernel::println!("({test_name}) thread {thread}: iteration {iteration} done");
        }
    }

    kernel::println!("({test_name}) PASS");
}
