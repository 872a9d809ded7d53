use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{
    builder::styling::{AnsiColor, Effects, Styles},
    Arg, ArgAction, ArgMatches, ColorChoice, Command,
};
use nonce_auth::{
    config::{ChallengeConfig, DEFAULT_AUDIENCE, DEFAULT_TOKEN_TTL, MAX_TTL},
    crypto::{codec, ecdsa, jwt::create_token},
};
use secrecy::{ExposeSecret, Secret};
use std::{fs, path::Path};
use tracing::{debug, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Registry};

const PUBLIC_KEY_FILE: &str = "public_key.pem";
const PRIVATE_KEY_FILE: &str = "private_key.pem";

fn private_key_arg() -> Arg {
    Arg::new("private-key")
        .long("private-key")
        .help("PKCS#8 PEM private key file")
        .env("NONCE_AUTH_PRIVATE_KEY")
        .default_value(PRIVATE_KEY_FILE)
}

fn public_key_arg() -> Arg {
    Arg::new("public-key")
        .long("public-key")
        .help("SubjectPublicKeyInfo PEM public key file")
        .env("NONCE_AUTH_PUBLIC_KEY")
        .default_value(PUBLIC_KEY_FILE)
}

fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    Command::new("nonce-auth")
        .about("Nonce challenge-response helper")
        .version(env!("CARGO_PKG_VERSION"))
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg(
            Arg::new("verbosity")
                .short('v')
                .long("verbose")
                .help("Verbosity level, repeat for more (default: ERROR)")
                .global(true)
                .action(ArgAction::Count),
        )
        .subcommand(
            Command::new("keygen")
                .about("Generate a P-256 key pair")
                .arg(private_key_arg())
                .arg(public_key_arg())
                .arg(
                    Arg::new("force")
                        .long("force")
                        .help("Overwrite existing key files")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("encode-key")
                .about("Print the encoded public key for a challenge request")
                .arg(public_key_arg()),
        )
        .subcommand(
            Command::new("jwt")
                .about("Create a token that contains a nonce using the ES256 signature algorithm")
                .arg(
                    Arg::new("nonce")
                        .help("Nonce returned by the challenge request")
                        .required(true),
                )
                .arg(private_key_arg())
                .arg(public_key_arg())
                .arg(
                    Arg::new("audience")
                        .long("audience")
                        .help("Token audience")
                        .default_value(DEFAULT_AUDIENCE),
                )
                .arg(
                    Arg::new("ttl")
                        .long("ttl")
                        .help("Token lifetime in seconds")
                        .default_value("300")
                        .value_parser(clap::value_parser!(i64).range(1..=MAX_TTL)),
                ),
        )
}

fn init_tracing(verbosity: u8) -> Result<()> {
    let verbosity_level = match verbosity {
        0 => tracing::Level::ERROR,
        1 => tracing::Level::WARN,
        2 => tracing::Level::INFO,
        3 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    // RUST_LOG=
    let env_filter = EnvFilter::builder()
        .with_default_directive(verbosity_level.into())
        .from_env_lossy();

    let subscriber = Registry::default().with(fmt_layer).with(env_filter);
    tracing::subscriber::set_global_default(subscriber)?;

    Ok(())
}

fn path_arg<'a>(matches: &'a ArgMatches, name: &str) -> Result<&'a Path> {
    matches
        .get_one::<String>(name)
        .map(Path::new)
        .with_context(|| format!("missing argument {name}"))
}

fn keygen(matches: &ArgMatches) -> Result<String> {
    let private_path = path_arg(matches, "private-key")?;
    let public_path = path_arg(matches, "public-key")?;

    if !matches.get_flag("force") {
        for path in [private_path, public_path] {
            if path.exists() {
                bail!("{} already exists, use --force to overwrite", path.display());
            }
        }
    }

    let pair = ecdsa::generate_key_pair()?;
    fs::write(private_path, pair.private_key_pem.expose_secret())
        .with_context(|| format!("failed to write {}", private_path.display()))?;
    fs::write(public_path, &pair.public_key_pem)
        .with_context(|| format!("failed to write {}", public_path.display()))?;

    info!(private_key = %private_path.display(), public_key = %public_path.display(), "key pair written");
    Ok(format!(
        "Key pair written to {} and {}",
        private_path.display(),
        public_path.display()
    ))
}

fn read_public_key(matches: &ArgMatches) -> Result<String> {
    let path = path_arg(matches, "public-key")?;
    let pem = fs::read_to_string(path)
        .with_context(|| format!("failed to read public key from {}", path.display()))?;

    // refuse to encode something the verifier would reject
    ecdsa::parse_public_key_pem(&pem)
        .with_context(|| format!("{} is not a P-256 public key", path.display()))?;
    Ok(pem)
}

fn encode_key(matches: &ArgMatches) -> Result<String> {
    let pem = read_public_key(matches)?;
    Ok(codec::encode(pem.as_bytes())?)
}

fn jwt(matches: &ArgMatches) -> Result<String> {
    let nonce = matches
        .get_one::<String>("nonce")
        .context("nonce argument is required")?;

    let config = ChallengeConfig {
        audience: matches
            .get_one::<String>("audience")
            .cloned()
            .unwrap_or_else(|| DEFAULT_AUDIENCE.to_string()),
        token_ttl: matches
            .get_one::<i64>("ttl")
            .copied()
            .unwrap_or(DEFAULT_TOKEN_TTL),
        ..ChallengeConfig::default()
    };
    config.validate()?;

    let private_path = path_arg(matches, "private-key")?;
    debug!(private_key = %private_path.display(), "reading private key");
    let private_key_pem = Secret::new(
        fs::read_to_string(private_path)
            .with_context(|| format!("failed to get private key from file {}", private_path.display()))?,
    );
    let public_key_pem = read_public_key(matches)?;

    let token = create_token(
        nonce,
        &private_key_pem,
        &public_key_pem,
        Utc::now().timestamp(),
        &config,
    )
    .context("failed to create signed token")?;

    Ok(token)
}

fn run(matches: &ArgMatches) -> Result<String> {
    match matches.subcommand() {
        Some(("keygen", sub)) => keygen(sub),
        Some(("encode-key", sub)) => encode_key(sub),
        Some(("jwt", sub)) => jwt(sub),
        Some((other, _)) => bail!("unknown command {other}"),
        None => bail!("a command is required"),
    }
}

fn main() -> Result<()> {
    let matches = new().get_matches();
    init_tracing(matches.get_count("verbosity"))?;

    let output = run(&matches)?;
    println!("{output}");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nonce_auth::validate_token;
    use std::path::PathBuf;

    fn scratch_dir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("nonce-auth-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn key_args(command: &str, dir: &Path) -> Vec<String> {
        let mut args = Vec::new();
        // encode-key only reads the public key
        if command != "encode-key" {
            args.push("--private-key".to_string());
            args.push(dir.join("private.pem").display().to_string());
        }
        args.push("--public-key".to_string());
        args.push(dir.join("public.pem").display().to_string());
        args
    }

    fn run_with(command: &str, extra: &[&str], dir: &Path) -> Result<String> {
        let mut args = vec!["nonce-auth".to_string(), command.to_string()];
        args.extend(extra.iter().map(|s| s.to_string()));
        args.extend(key_args(command, dir));
        run(&new().try_get_matches_from(args)?)
    }

    #[test]
    fn test_new() {
        let command = new();

        assert_eq!(command.get_name(), "nonce-auth");
        assert_eq!(
            command.get_version().unwrap().to_string(),
            env!("CARGO_PKG_VERSION")
        );
    }

    #[test]
    fn test_jwt_requires_nonce() {
        let result = new().try_get_matches_from(vec!["nonce-auth", "jwt"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_jwt_ttl_bounds() {
        for ttl in ["0", "86401", "9223372036854775807"] {
            let result = new().try_get_matches_from(vec!["nonce-auth", "jwt", "abc", "--ttl", ttl]);
            assert!(result.is_err(), "ttl {ttl} should be rejected");
        }

        let matches = new()
            .try_get_matches_from(vec!["nonce-auth", "jwt", "abc", "--ttl", "86400"])
            .unwrap();
        let (_, sub) = matches.subcommand().unwrap();
        assert_eq!(sub.get_one::<i64>("ttl").copied(), Some(MAX_TTL));
    }

    #[test]
    fn test_jwt_defaults() {
        let matches = new()
            .try_get_matches_from(vec!["nonce-auth", "-vv", "jwt", "abc"])
            .unwrap();
        assert_eq!(matches.get_count("verbosity"), 2);

        let (_, sub) = matches.subcommand().unwrap();
        assert_eq!(sub.get_one::<String>("nonce").unwrap(), "abc");
        assert_eq!(sub.get_one::<i64>("ttl").copied(), Some(300));
        assert_eq!(sub.get_one::<String>("audience").unwrap(), "wheltee");
    }

    #[test]
    fn test_keygen_encode_and_sign() {
        let dir = scratch_dir();

        run_with("keygen", &[], &dir).unwrap();
        assert!(run_with("keygen", &[], &dir).is_err());
        run_with("keygen", &["--force"], &dir).unwrap();

        let encoded = run_with("encode-key", &[], &dir).unwrap();
        let token = run_with("jwt", &["nonce-1"], &dir).unwrap();

        let verified =
            validate_token(&token, &ChallengeConfig::default(), Utc::now().timestamp()).unwrap();
        assert_eq!(verified.public_key, encoded);
        assert_eq!(verified.claims.jti, "nonce-1");

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_jwt_missing_key_files() {
        let dir = scratch_dir();
        assert!(run_with("jwt", &["nonce-1"], &dir).is_err());
        fs::remove_dir_all(dir).unwrap();
    }
}
