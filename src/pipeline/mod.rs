//! Processing pipeline components.

mod coordinator;
mod processor;

pub use coordinator::{
    ProcessCheck, assign_outputs, collect_input_files, output_dir_for, output_path_for, sidecar_path_for,
    should_process,
};
pub use processor::{JobContext, ProcessResult, Toolchain, process_file, render_segments};
