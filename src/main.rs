use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use std::env;
use std::path::Path;
use std::process;

use review_gate::config::GateConfig;
use review_gate::hooks::{
    hook_path, hook_status, install_hook, run_pre_commit_hook, write_sample_config, HookStatus,
};
use review_gate::review::print_outcome;
use review_gate::utils::{get_git_root, is_git_repo};

/// Review Gate
///
/// 提交前将暂存 diff 交给 LLM 审查，只有明确拒绝才阻塞提交
#[derive(Parser)]
#[command(name = "review-gate")]
#[command(author, version = env!("REVIEW_GATE_VERSION"), about)]
#[command(
    long_about = "Git pre-commit hook that sends the staged diff to an LLM review service.\n\
                  Run without arguments from a pre-commit hook. Exit code 0 lets the commit\n\
                  proceed; 1 blocks it. Missing credentials and service errors never block."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// 审查暂存变更（默认命令）
    Run,

    /// 安装 pre-commit hook 到当前仓库
    Install {
        /// 覆盖已存在的 pre-commit hook
        #[arg(short, long)]
        force: bool,

        /// 同时写入示例配置 .review-gate.json
        #[arg(long)]
        config: bool,
    },

    /// 诊断环境和配置
    Doctor,
}

// ═══════════════════════════════════════════════════════════════════
// Gate 执行
// ═══════════════════════════════════════════════════════════════════

async fn run_gate() -> Result<()> {
    let cwd = env::current_dir()?;

    let repo_root = match get_git_root(Some(&cwd)) {
        Ok(root) => root,
        Err(e) => {
            eprintln!("{}", "❌ Not inside a git repository".red());
            log::debug!("{:#}", e);
            process::exit(1);
        }
    };

    let config = GateConfig::load(&repo_root);

    let outcome = match run_pre_commit_hook(&repo_root, &config).await {
        Ok(outcome) => outcome,
        Err(e) => {
            // 无法收集变更就无法审查
            eprintln!(
                "{}",
                format!("❌ Failed to collect staged changes: {:#}", e).red()
            );
            process::exit(1);
        }
    };

    print_outcome(&outcome);

    if outcome.exit_code() != 0 {
        process::exit(outcome.exit_code());
    }

    Ok(())
}

// ═══════════════════════════════════════════════════════════════════
// 安装
// ═══════════════════════════════════════════════════════════════════

fn install(force: bool, with_config: bool) -> Result<()> {
    let cwd = env::current_dir()?;
    let repo_root = get_git_root(Some(&cwd))?;

    let path = install_hook(&repo_root, force)?;
    println!("{}", "✅ pre-commit hook installed".green().bold());
    println!("   📁 {}", path.display().to_string().cyan());

    if with_config {
        if write_sample_config(&repo_root)? {
            println!("   📝 Wrote {}", ".review-gate.json".cyan());
        } else {
            println!("   {}", ".review-gate.json already exists, left untouched".yellow());
        }
    }

    let config = GateConfig::load(&repo_root);
    if config.credential.is_none() {
        println!();
        println!(
            "💡 Set {} to enable reviews; without it commits are never blocked",
            config.provider.credential_var().cyan()
        );
    }

    Ok(())
}

// ═══════════════════════════════════════════════════════════════════
// 诊断环境
// ═══════════════════════════════════════════════════════════════════

fn doctor() -> Result<()> {
    println!("{}", "🔍 Review Gate Doctor".cyan().bold());
    println!();

    let cwd = env::current_dir()?;

    print!("📁 Git repository... ");
    if !is_git_repo(Some(&cwd)) {
        println!("{}", "✗".red());
        println!("   {}", "Not inside a git repository".red());
        return Ok(());
    }
    let repo_root = get_git_root(Some(&cwd))?;
    println!("{}", "✓".green());
    println!("   {}", repo_root.display().to_string().yellow());

    println!();
    report_hook(&repo_root)?;

    let config = GateConfig::load(&repo_root);

    println!();
    println!("⚙️  Configuration:");
    println!("   Provider: {}", config.provider.to_string().cyan());
    println!("   Model: {}", config.model().cyan());
    println!("   Endpoint: {}", config.endpoint().cyan());
    println!("   Timeout: {}s", config.timeout_secs);
    println!("   Max diff: {} bytes", config.max_diff_chars);
    println!("   Extensions: {}", config.extensions.join(" "));

    let var = config.provider.credential_var();
    if config.credential.is_some() {
        println!("   {} {} is set", "✓".green(), var.yellow());
    } else {
        println!(
            "   {} {} {}",
            "✗".red(),
            var.yellow(),
            "(missing, reviews will be skipped)".red()
        );
    }

    println!();
    println!("{}", "✅ Diagnostic complete".green().bold());

    Ok(())
}

fn report_hook(repo_root: &Path) -> Result<()> {
    let path = hook_path(repo_root)?;
    println!("🎯 pre-commit hook: {}", path.display().to_string().yellow());

    match hook_status(repo_root)? {
        HookStatus::Installed { executable: true } => {
            println!("   {} installed", "✓".green());
        }
        HookStatus::Installed { executable: false } => {
            println!("   {} installed but not executable", "!".yellow());
        }
        HookStatus::Foreign => {
            println!(
                "   {} another pre-commit hook is present; add `review-gate` to it",
                "!".yellow()
            );
        }
        HookStatus::Missing => {
            println!("   {} not installed", "✗".red());
            println!("   Run {} to install", "review-gate install".cyan());
        }
    }

    Ok(())
}

// ═══════════════════════════════════════════════════════════════════
// Main
// ═══════════════════════════════════════════════════════════════════

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::new().filter_or("REVIEW_GATE_LOG", "warn"))
        .format_timestamp(None)
        .init();

    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_gate().await,
        Commands::Install { force, config } => install(force, config),
        Commands::Doctor => doctor(),
    }
}
