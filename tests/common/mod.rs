#![allow(dead_code)]

use assert_cmd::cargo_bin;
use std::io::Write;
use std::path::Path;
use std::process::Command;
use tempfile::NamedTempFile;

pub const HEADER: &str = "command,user,arg1,arg2,arg3,arg4,arg5,arg6";

/// Writes a request script with the standard header row.
pub fn script(rows: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{HEADER}").unwrap();
    for row in rows {
        writeln!(file, "{row}").unwrap();
    }
    file
}

/// The binary with cheap hashing and a private upload directory.
pub fn grocer(uploads: &Path) -> Command {
    let mut cmd = Command::new(cargo_bin!("grocer"));
    cmd.env("RUST_LOG", "info")
        .env("GROCER_ARGON2_M_COST", "8")
        .env("GROCER_ARGON2_T_COST", "1")
        .env("GROCER_UPLOAD_DIR", uploads)
        .env_remove("GROCER_ADMIN_USERNAME")
        .env_remove("GROCER_ADMIN_PASSWORD");
    cmd
}

/// Admin login plus a small dairy catalog: category 2, eggs 3, butter 4.
pub const CATALOG: [&str; 4] = [
    "admin_login,,admin,admin",
    "create_category,admin,Dairy",
    "create_product,admin,Eggs,3.00,2,Free range",
    "create_product,admin,Butter,5.00,2",
];
