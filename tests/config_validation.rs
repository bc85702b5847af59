use clap::Parser;
use opus_torture::cli::Cli;
use opus_torture::error::EXIT_CONFIG;
use opus_torture::{Backend, ConfigError, RunConfig, SampleFormat, TortureError};

fn config(backend: Backend, period: usize) -> RunConfig {
    RunConfig {
        backend,
        period,
        ..RunConfig::new("out.wav")
    }
}

#[test]
fn standard_rejects_period_121() {
    assert!(matches!(
        config(Backend::Standard, 121).validate(),
        Err(ConfigError::Period { period: 121, .. })
    ));
}

#[test]
fn standard_accepts_multiples_of_120() {
    for period in [120, 240, 480, 960, 2880] {
        assert_eq!(config(Backend::Standard, period).validate(), Ok(()));
    }
}

#[test]
fn custom_accepts_power_of_two() {
    for period in [64, 128, 256, 512, 1024] {
        assert_eq!(config(Backend::Custom, period).validate(), Ok(()));
    }
}

#[test]
fn custom_rejects_non_power_of_two() {
    assert!(matches!(
        config(Backend::Custom, 100).validate(),
        Err(ConfigError::Period { period: 100, .. })
    ));
    assert!(config(Backend::Custom, 2048).validate().is_err());
    assert!(config(Backend::Custom, 32).validate().is_err());
}

#[test]
fn sample_rate_bounds() {
    let low = RunConfig {
        sample_rate: 4000,
        ..RunConfig::new("out.wav")
    };
    assert_eq!(low.validate(), Err(ConfigError::SampleRate(4000)));
    let high = RunConfig {
        sample_rate: 192_001,
        ..RunConfig::new("out.wav")
    };
    assert_eq!(high.validate(), Err(ConfigError::SampleRate(192_001)));
    let edge = RunConfig {
        sample_rate: 8000,
        ..RunConfig::new("out.wav")
    };
    assert_eq!(edge.validate(), Ok(()));
}

#[test]
fn bitrate_bounds() {
    let zero = RunConfig {
        kbps: 0,
        ..RunConfig::new("out.wav")
    };
    assert_eq!(zero.validate(), Err(ConfigError::Bitrate(0)));
    let high = RunConfig {
        kbps: 513,
        ..RunConfig::new("out.wav")
    };
    assert_eq!(high.validate(), Err(ConfigError::Bitrate(513)));
}

#[test]
fn blocks_per_mode_is_one_second() {
    assert_eq!(config(Backend::Standard, 120).blocks_per_mode(), 400);
    assert_eq!(config(Backend::Custom, 1024).blocks_per_mode(), 46);
}

#[test]
fn cli_defaults() {
    let cli = Cli::try_parse_from(["opus-torture", "out.wav"]).unwrap();
    assert_eq!(cli.to_config(), Ok(RunConfig::new("out.wav")));
    assert_eq!(cli.seed, None);
}

#[test]
fn cli_short_flags() {
    let cli = Cli::try_parse_from([
        "opus-torture", "-c", "-e", "-f", "-k", "64", "-p", "256", "-s", "44100", "x.wav",
    ])
    .unwrap();
    let config = cli.to_config().unwrap();
    assert_eq!(config.backend, Backend::Custom);
    assert!(config.evil);
    assert_eq!(config.format, SampleFormat::Float32);
    assert_eq!(config.kbps, 64);
    assert_eq!(config.period, 256);
    assert_eq!(config.sample_rate, 44100);
}

#[test]
fn cli_long_flags() {
    let cli = Cli::try_parse_from([
        "opus-torture",
        "--evil",
        "--kbps",
        "32",
        "--period",
        "480",
        "--samplerate",
        "16000",
        "--seed",
        "9",
        "y.wav",
    ])
    .unwrap();
    assert_eq!(cli.seed, Some(9));
    assert_eq!(cli.to_config().unwrap().sample_rate, 16000);

    let alias = Cli::try_parse_from(["opus-torture", "--sample-rate", "24000", "z.wav"]).unwrap();
    assert_eq!(alias.samplerate, 24000);
}

#[test]
fn cli_requires_filename() {
    let err = Cli::try_parse_from(["opus-torture", "-e"]).unwrap_err();
    assert_eq!(
        err.kind(),
        clap::error::ErrorKind::MissingRequiredArgument
    );
}

#[test]
fn cli_help_and_version() {
    let help = Cli::try_parse_from(["opus-torture", "-h"]).unwrap_err();
    assert_eq!(help.kind(), clap::error::ErrorKind::DisplayHelp);
    let version = Cli::try_parse_from(["opus-torture", "-V"]).unwrap_err();
    assert_eq!(version.kind(), clap::error::ErrorKind::DisplayVersion);
}

#[test]
fn out_of_range_numbers_are_config_errors() {
    let negative = Cli::try_parse_from(["opus-torture", "-k", "-5", "out.wav"]).unwrap();
    let err = negative.to_config().unwrap_err();
    assert_eq!(err, ConfigError::Bitrate(-5));
    assert_eq!(TortureError::from(err).exit_code(), EXIT_CONFIG);

    let huge = Cli::try_parse_from(["opus-torture", "-s", "99999999999", "out.wav"]).unwrap();
    let err = huge.to_config().unwrap_err();
    assert_eq!(err, ConfigError::SampleRate(99_999_999_999));
    assert_eq!(TortureError::from(err).exit_code(), EXIT_CONFIG);
}

#[test]
fn in_range_numbers_reach_validation() {
    let cli = Cli::try_parse_from(["opus-torture", "-k", "600", "out.wav"]).unwrap();
    let config = cli.to_config().unwrap();
    assert_eq!(config.validate(), Err(ConfigError::Bitrate(600)));
}
