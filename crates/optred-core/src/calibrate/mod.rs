pub mod combine;
pub mod correct;

pub use combine::{build_master_bias, build_master_flat, normalize_flat};
pub use correct::correct_frame;

/// Local time stamp used in HISTORY lines.
pub(crate) fn timestamp() -> String {
    chrono::Local::now()
        .format("%Y-%m-%dT%H:%M:%S%.6f")
        .to_string()
}
