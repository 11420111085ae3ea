mod app;
mod audio;
mod config;
mod gesture;
mod library;
mod logging;
mod now_playing;
mod playback;
mod runtime;
mod ui;

#[cfg(test)]
mod test_env;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
