mod sleep;

pub use self::sleep::sleep;
