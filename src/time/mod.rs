//! Clock and delay abstractions.
//!
//! The hub client never reads hardware timers directly. Token expiry is
//! computed from a [`Clock`] and every wait (link settle time, read polling)
//! goes through a [`Delay`], so both can be backed by an RTC, a modem's
//! network time, or a test double.

/// A wall-clock time source.
pub trait Clock {
    /// Current time as seconds since the Unix epoch.
    fn now(&self) -> u64;

    /// Whether the clock has been set since boot.
    ///
    /// A clock that has never been synchronised reports `false`, and no
    /// access token is generated against it.
    fn is_set(&self) -> bool;
}

/// A blocking delay provider.
pub trait Delay {
    /// Block for at least `ms` milliseconds.
    fn delay_ms(&mut self, ms: u32);
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now(&self) -> u64 {
        (**self).now()
    }

    fn is_set(&self) -> bool {
        (**self).is_set()
    }
}

impl<T: Delay + ?Sized> Delay for &mut T {
    fn delay_ms(&mut self, ms: u32) {
        (**self).delay_ms(ms)
    }
}

#[cfg(feature = "std")]
pub use self::std_impl::{SystemClock, ThreadDelay};

#[cfg(feature = "std")]
mod std_impl {
    use super::{Clock, Delay};
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    /// [`Clock`] backed by [`SystemTime`].
    ///
    /// Reports itself unset when the system time is before the epoch.
    #[derive(Debug, Default, Clone, Copy)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> u64 {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0)
        }

        fn is_set(&self) -> bool {
            SystemTime::now().duration_since(UNIX_EPOCH).is_ok()
        }
    }

    /// [`Delay`] backed by [`std::thread::sleep`].
    #[derive(Debug, Default, Clone, Copy)]
    pub struct ThreadDelay;

    impl Delay for ThreadDelay {
        fn delay_ms(&mut self, ms: u32) {
            std::thread::sleep(Duration::from_millis(u64::from(ms)));
        }
    }
}
