//! Help message display for CLI.

#![allow(clippy::print_stdout)]

/// Print help when `quietcut` is run without inputs.
///
/// First-time users without FFmpeg get install steps; everyone else gets a
/// short usage reminder.
pub fn print_smart_help(ffmpeg_available: bool) {
    if ffmpeg_available {
        print_usage_help();
    } else {
        print_first_time_help();
    }
}

/// Print setup guide for users without FFmpeg on `PATH`.
pub fn print_first_time_help() {
    println!("FFmpeg was not found. quietcut needs both ffmpeg and ffprobe:");
    println!();
    println!("1. Install FFmpeg:");
    println!("   • Debian/Ubuntu: sudo apt install ffmpeg");
    println!("   • macOS:         brew install ffmpeg");
    println!("   • Windows:       winget install ffmpeg");
    println!();
    println!("2. Or point quietcut at existing binaries:");
    println!("   quietcut config init");
    println!("   then set ffmpeg.ffmpeg_path and ffmpeg.ffprobe_path in the config file");
    println!();
    println!("3. Trim a video:");
    println!("   quietcut lecture.mp4");
    println!();
    println!("Run 'quietcut -h' for all options.");
}

/// Print brief usage reminder.
pub fn print_usage_help() {
    println!("Usage: quietcut [FILES]... [OPTIONS]");
    println!();
    println!("Example: quietcut lecture.mp4 -n -35 -d 0.75");
    println!("         quietcut lectures/ --dry-run --segments-format csv");
    println!();
    println!("Run 'quietcut -h' for all options or 'quietcut config show' for current settings.");
}
