//! MyPlugin exec generator binary

use std::process::ExitCode;

use kustomize_exec_plugin::generator_main;
use myplugin::MyPlugin;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    generator_main::<MyPlugin>().await
}
