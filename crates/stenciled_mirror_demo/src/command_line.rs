use eyre::WrapErr;
use eyre::bail;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DemoCommandLine {
    pub use_warp_device: bool,
    pub frames: u64,
    pub latency_ms: u64,
    pub resize_every: Option<u64>,
}

impl Default for DemoCommandLine {
    fn default() -> Self {
        Self {
            use_warp_device: false,
            frames: 240,
            latency_ms: 2,
            resize_every: Some(90),
        }
    }
}

pub fn build_command_line() -> eyre::Result<DemoCommandLine> {
    parse_args(std::env::args().skip(1))
}

pub fn parse_args(args: impl IntoIterator<Item = String>) -> eyre::Result<DemoCommandLine> {
    let mut command_line = DemoCommandLine::default();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        let flag = arg.trim_start_matches(['-', '/']).to_ascii_lowercase();
        match flag.as_str() {
            "warp" => command_line.use_warp_device = true,
            "frames" => command_line.frames = number(&flag, args.next())?,
            "latency-ms" => command_line.latency_ms = number(&flag, args.next())?,
            "resize-every" => {
                command_line.resize_every = match number(&flag, args.next())? {
                    0 => None,
                    every => Some(every),
                }
            }
            _ => bail!("unrecognized argument {arg:?}"),
        }
    }
    Ok(command_line)
}

fn number(flag: &str, value: Option<String>) -> eyre::Result<u64> {
    let Some(value) = value else {
        bail!("-{flag} expects a number");
    };
    value
        .parse()
        .wrap_err_with(|| format!("-{flag} expects a number, got {value:?}"))
}
