//! # clipper — 应用入口
//!
//! 本文件仅负责日志初始化、参数解析与启动失败时的退出码。
//! 业务逻辑分布在各子模块中，详见 `lib.rs` 架构文档。

use std::process::ExitCode;

use clap::Parser;
use clipper::cli::Cli;
use clipper::highlight::Highlighter;
use clipper::settings::Settings;

fn list_lexers() -> ExitCode {
    match Highlighter::new() {
        Ok(highlighter) => {
            for lexer in highlighter.lexers() {
                println!("{:<32} {}", lexer.name, lexer.extensions.join(", "));
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("加载语法定义失败: {err}");
            ExitCode::FAILURE
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if cli.list_lexers {
        return list_lexers();
    }

    let settings = match Settings::resolve(&cli) {
        Ok(settings) => settings,
        Err(err) => {
            log::error!("启动失败: {err}");
            return ExitCode::FAILURE;
        }
    };

    match clipper::run(&settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("启动失败: {err}");
            ExitCode::FAILURE
        }
    }
}
