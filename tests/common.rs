#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use rtimeclock::db::accounts::insert_account;
use rtimeclock::db::pool::DbPool;
use rtimeclock::models::account::Role;
use std::env;
use std::fs;
use std::path::PathBuf;

pub fn rtc() -> Command {
    cargo_bin_cmd!("rtimeclock")
}

/// Create a unique test DB path inside the system temp dir and remove any existing file
pub fn setup_test_db(name: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_rtimeclock.sqlite", name));
    let db_path = path.to_string_lossy().to_string();
    fs::remove_file(&db_path).ok();
    db_path
}

/// Create a temporary output file path inside tempdir and ensure it's removed
pub fn temp_out(name: &str, ext: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_out.{}", name, ext));
    let p = path.to_string_lossy().to_string();
    fs::remove_file(&p).ok();
    p
}

/// Initialize the DB through the CLI and create one active employee
pub fn init_db_with_user(db_path: &str, user: &str) {
    rtc()
        .args(["--db", db_path, "--test", "init"])
        .assert()
        .success();

    rtc()
        .args(["--db", db_path, "account", "add", user, "--active"])
        .assert()
        .success();
}

/// Fixed timestamp on 2025-03-03
pub fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 3, 3)
        .and_then(|d| d.and_hms_opt(h, m, s))
        .expect("valid test timestamp")
}

pub fn minutes(m: i64) -> TimeDelta {
    TimeDelta::minutes(m)
}

/// In-memory store with one active account; returns the pool and the account id
pub fn memory_pool_with_account(username: &str) -> (DbPool, i64) {
    let pool = DbPool::in_memory().expect("in-memory db");
    let id = pool
        .with_conn(|conn| insert_account(conn, username, Role::Employee, true))
        .expect("insert account");
    (pool, id)
}
