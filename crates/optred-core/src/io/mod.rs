pub mod fits;
pub mod layout;
pub mod output;
pub mod trim;

pub use fits::{read_frame, read_header, read_master, write_frame};
pub use output::{
    corrected_path, is_corrected_output, master_bias_path, master_flat_path, prepare_output,
    OverwritePolicy,
};
