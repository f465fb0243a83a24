use std::fs;
use std::time::Duration;

async fn load(path: &str) -> String {
    // want: blocking call `std::fs::read_to_string` inside async fn `load`
    let text = std::fs::read_to_string(path);
    // want: blocking call `std::thread::sleep` inside async fn `load`
    std::thread::sleep(Duration::from_millis(10));
    text.unwrap_or_default()
}

fn sync_load(path: &str) -> std::io::Result<Vec<u8>> {
    fs::read(path)
}

fn spawn() {
    let _task = async {
        // want: blocking call `fs::write` inside async block
        fs::write("out.txt", b"data")
    };
}
