// build.rs

use clap::{Arg, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::io;
use std::path::Path;

fn build_cli() -> Command {
    Command::new("autowix")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Autowix Contributors")
        .about("Expand an annotated XML template into an installer manifest with stable GUIDs")
        .long_about(
            "Reads INFILE and writes <stem>.wxs beside it. Attribute values of the form \
             autowix:guid:KEY become GUIDs that stay stable across runs, recorded in \
             <stem>.awxg. Each <autowixfilecomponents from=\"PATH\"/> element is replaced \
             by Directory, Component and File elements mirroring PATH on disk.",
        )
        .disable_help_flag(true)
        .disable_version_flag(true)
        .arg(
            Arg::new("input")
                .value_name("INFILE")
                .required(true)
                .help("Template to transform; <stem>.wxs and <stem>.awxg are written beside it"),
        )
}

fn write_man_page(out_dir: &Path) -> io::Result<()> {
    let mut page = Vec::new();
    Man::new(build_cli()).render(&mut page)?;
    fs::create_dir_all(out_dir)?;
    fs::write(out_dir.join("autowix.1"), page)
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // man/ sits beside Cargo.toml so packagers can pick it up
    let Some(root) = env::var_os("CARGO_MANIFEST_DIR") else {
        println!("cargo:warning=man page skipped: CARGO_MANIFEST_DIR is unset");
        return;
    };
    let out_dir = Path::new(&root).join("man");
    if let Err(e) = write_man_page(&out_dir) {
        println!("cargo:warning=man page not written to {}: {}", out_dir.display(), e);
    }
}
