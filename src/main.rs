mod audio;
mod backdrop;
mod catalog;
mod config;
mod error;
mod runtime;
mod store;
mod sync;
mod transport;
mod tween;
mod ui;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
