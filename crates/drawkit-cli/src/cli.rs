use clap::Parser;
use std::path::PathBuf;

/// 加载 JSON 图纸，输出范围并通过渲染缓存绘制模型空间
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// JSON 图纸文件
    pub input: PathBuf,

    /// JSON 配置文件（采样数量、是否使用块缓存）
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// 输出调试日志
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// 逐个输出图元的范围
    #[arg(long, default_value_t = false)]
    pub list: bool,
}
