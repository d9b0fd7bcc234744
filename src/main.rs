//! Host-side helper: `cargo run` builds the WASM bundle into `static/pkg`,
//! serves `static/` on port 8000 and prints the demo pages.

use std::io;
use std::process::{Command, Stdio};
use std::{env, thread, time::Duration};

const PORT: u16 = 8000;

/// Demo pages under `static/`, with the `data-demo` value each one sets.
const DEMOS: &[(&str, &str)] = &[
    ("image-click.html", "image-click"),
    ("image-scroll.html", "image-scroll"),
    ("image-scroll-fixed.html", "image-scroll-fixed"),
    ("image-mousemove.html", "image-mousemove"),
    ("text-morph.html", "text-morph"),
    ("dots.html", "dots"),
    ("dots-moving.html", "dots-moving"),
];

fn main() -> io::Result<()> {
    if env::var("TARGET").unwrap_or_default() == "wasm32-unknown-unknown" {
        return Ok(());
    }

    println!("Building WASM pkg …");
    match Command::new("wasm-pack")
        .args(["build", "--release", "--target", "web", "--out-dir", "static/pkg"])
        .status()
    {
        Ok(st) if st.success() => {}
        Ok(_) => {
            eprintln!("wasm-pack finished with errors. Ensure wasm-pack is installed (https://rustwasm.github.io/wasm-pack/).");
            std::process::exit(1);
        }
        Err(_) => {
            eprintln!("wasm-pack not found in PATH. Skipping wasm build; the demos may load a stale bundle.");
        }
    }

    println!("Launching local server at http://127.0.0.1:{} …", PORT);
    let mut server = Command::new("python3")
        .args(["-m", "http.server", &PORT.to_string(), "--directory", "static"])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;

    for (page, demo) in DEMOS {
        println!("  {:<20} http://127.0.0.1:{}/{}", demo, PORT, page);
    }

    loop {
        if let Some(status) = server.try_wait()? {
            eprintln!("http server exited: {}", status);
            return Ok(());
        }
        thread::sleep(Duration::from_secs(5));
    }
}
