mod expiry;
mod key;
mod persistence;

pub use expiry::init_expiry_worker;
pub use key::IdempotencyKey;
pub use persistence::abort;
pub use persistence::begin;
pub use persistence::complete;
pub use persistence::BeginOutcome;
