use clap::{Arg, ArgAction, Command};
use std::str::FromStr;
use tracing::info;
use uavsim::commands::CommandQueue;
use uavsim::logging::{self, LogConfig, LogOutput};
use uavsim::scenario::SimParams;
use uavsim::simulation::{self, SimulationEngine};

fn main() {
    // コマンドライン引数の解析
    let matches = Command::new("uavsim")
        .version("0.1.0")
        .about("UAV飛行シミュレーション (UAV Flight Simulation)")
        .long_about("一定速度のUAV群が目標地点コマンドに従って飛行し、\n\
                     到達後は目標を周回する様子を時間駆動型でシミュレーションします。")
        .arg(
            Arg::new("params")
                .value_name("PARAMS")
                .required(true)
                .help("パラメータファイル (SimParams.ini または .yaml)")
        )
        .arg(
            Arg::new("commands")
                .value_name("COMMANDS")
                .required(true)
                .help("コマンドファイル (SimCmds.txt)")
        )
        .arg(
            Arg::new("output")
                .value_name("OUTPUT_FOLDER")
                .default_value(".")
                .help("航跡ファイル (UAV<id>.txt) の出力先フォルダ")
        )
        .arg(
            Arg::new("info")
                .short('i')
                .long("info")
                .action(ArgAction::SetTrue)
                .help("パラメータとコマンドの情報のみ表示して終了")
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .help("詳細出力レベル (-v: 基本, -vv: 詳細, -vvv: デバッグ)")
        )
        .arg(
            Arg::new("log-output")
                .long("log-output")
                .value_name("TARGET")
                .value_parser(["console", "file", "both"])
                .default_value("console")
                .help("ログ出力先")
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .value_name("LEVEL")
                .help("ログレベル (trace, debug, info, warn, error)")
        )
        .arg(
            Arg::new("log-dir")
                .long("log-dir")
                .value_name("DIR")
                .default_value("logs")
                .help("ログファイルの出力先ディレクトリ")
        )
        .get_matches();

    let verbose_level = matches.get_count("verbose");

    let mut log_config = LogConfig {
        level: logging::level_for_verbosity(verbose_level),
        ..LogConfig::default()
    };
    if let Some(level) = matches.get_one::<String>("log-level") {
        log_config.level = logging::parse_log_level(level);
    }
    if let Some(output) = matches.get_one::<String>("log-output") {
        log_config.output = LogOutput::from_str(output).unwrap_or(LogOutput::Console);
    }
    if let Some(log_dir) = matches.get_one::<String>("log-dir") {
        log_config.log_dir = log_dir.clone();
    }

    let _log_guard = match logging::init_logging(log_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("警告: ログ初期化に失敗しました: {}", e);
            None
        }
    };

    // clapで必須指定済み
    let params_path = matches.get_one::<String>("params").map(String::as_str).unwrap_or_default();
    let commands_path = matches.get_one::<String>("commands").map(String::as_str).unwrap_or_default();
    let output_folder = matches.get_one::<String>("output").map(String::as_str).unwrap_or(".");

    let result = run_simulation(
        params_path,
        commands_path,
        output_folder,
        matches.get_flag("info"),
        verbose_level,
    );

    match result {
        Ok(()) => {
            println!("{}", simulation::COMPLETION_MESSAGE);
        }
        Err(e) => {
            eprintln!("エラー: {}", e);
            std::process::exit(1);
        }
    }
}

/// パラメータとコマンドを読み込んでシミュレーションを実行
fn run_simulation(
    params_path: &str,
    commands_path: &str,
    output_folder: &str,
    info_only: bool,
    verbose_level: u8,
) -> Result<(), Box<dyn std::error::Error>> {
    let params = SimParams::from_file(params_path)?;
    let commands = CommandQueue::from_file(commands_path)?;

    if verbose_level > 0 {
        info!("パラメータファイル読み込み完了: {}", params_path);
        info!("コマンドファイル読み込み完了: {} ({}件)", commands_path, commands.len());
    }

    // 情報表示のみの場合
    if info_only {
        params.print_summary();
        println!();
        println!("=== コマンド ===");
        println!("コマンド数: {}件", commands.len());
        if let Some(last_time) = commands.last_time() {
            println!("最終コマンド時刻: {:.2}秒", last_time);
        }
        return Ok(());
    }

    let mut simulation = SimulationEngine::new(params, commands, verbose_level)?;
    simulation.run();
    simulation.save_outputs(output_folder)?;

    for uav in simulation.summary() {
        info!(
            "UAV{}: 位置=({:.2}, {:.2}) 方位={:.2}度 目標=({:.2}, {:.2}) {} 記録={}件",
            uav.id,
            uav.position.x,
            uav.position.y,
            uav.heading,
            uav.target.x,
            uav.target.y,
            if uav.awaiting { "周回中" } else { "飛行中" },
            uav.samples
        );
    }

    Ok(())
}
