#![forbid(unsafe_code)]

//! Tornvik CLI: XAdES-BES signing of XML documents.

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use tornvik_c14n::{C14nMode, Canonicalizer, ExclusiveCanonicalizer};
use tornvik_core::{Error, HashAlgorithm};
use tornvik_keys::CredentialBundle;
use tornvik_xades::SigningContext;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "tornvik", about = "Tornvik: XAdES-BES signatures for XML documents", version)]
struct Cli {
    /// Verbose output (debug logging unless RUST_LOG is set)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign an XML document with an enveloped XAdES-BES signature
    Sign(SignArgs),

    /// List supported algorithms
    Info,
}

#[derive(Args)]
struct SignArgs {
    /// XML document to sign
    file: PathBuf,

    /// RSA private key (PKCS#8 or PKCS#1, PEM or DER)
    #[arg(short = 'k', long)]
    key: PathBuf,

    /// Signing certificate (PEM or DER)
    #[arg(long)]
    cert: PathBuf,

    /// Additional certificates for KeyInfo (PEM, one or more blocks)
    #[arg(long)]
    chain: Option<PathBuf>,

    /// Hash for the signature method and both digests (sha1, sha256, sha512)
    #[arg(long)]
    hash: Option<HashAlgorithm>,

    /// Canonicalization for SignedInfo and both references
    #[arg(long)]
    c14n: Option<C14nMode>,

    /// Digest hash of the data reference
    #[arg(long = "data-hash")]
    data_hash: Option<HashAlgorithm>,

    /// Canonicalization of the data reference
    #[arg(long = "data-c14n")]
    data_c14n: Option<C14nMode>,

    /// InclusiveNamespaces prefix for exclusive data canonicalization
    #[arg(long = "inclusive-ns")]
    inclusive_ns: Vec<String>,

    /// Digest hash of the SignedProperties reference
    #[arg(long = "props-hash")]
    props_hash: Option<HashAlgorithm>,

    /// Canonicalization of the SignedProperties reference
    #[arg(long = "props-c14n")]
    props_c14n: Option<C14nMode>,

    /// Sign the element with this Id instead of the whole document
    #[arg(long = "reference-id")]
    reference_id: Option<String>,

    /// Output only the Signature, without the enveloped-signature transform
    #[arg(long)]
    detached: bool,

    /// Derive element Ids from a fresh time-based UUID
    #[arg(long = "unique-ids")]
    unique_ids: bool,

    /// Use this UUID for element Ids (implies --unique-ids)
    #[arg(long = "signature-id")]
    signature_id: Option<Uuid>,

    /// Signing time (RFC 3339) instead of the current time
    #[arg(long = "signing-time")]
    signing_time: Option<String>,

    /// Prefix for the XML-DSig namespace (empty for the default namespace)
    #[arg(long = "ds-prefix", default_value = "ds")]
    ds_prefix: String,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Sign(args) => cmd_sign(args),
        Commands::Info => cmd_info(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_sign(args: SignArgs) -> Result<(), Error> {
    let xml = read_file(&args.file)?;
    let document = tornvik_xml::parse_document(&xml)?;
    let ctx = build_context(&args)?;
    tracing::info!(file = %args.file.display(), uri = %ctx.data.reference_uri, "signing");

    let output = if args.detached {
        let data = tornvik_xades::resolve_reference(&document, &ctx.data.reference_uri)?;
        let signature = tornvik_xades::sign_reference(&data, &ctx)?;
        tornvik_xml::writer::to_document_string(&signature)
    } else {
        let signed = tornvik_xades::sign_document(document, &ctx)?;
        tornvik_xml::writer::document_to_string(&signed)
    };
    write_output(args.output, output.as_bytes())
}

fn build_context(args: &SignArgs) -> Result<SigningContext, Error> {
    let credentials = CredentialBundle::from_files(&args.key, &args.cert, args.chain.as_deref())?;
    let mut ctx = SigningContext::new(credentials);

    if let Some(hash) = args.hash {
        ctx = ctx.with_hash(hash);
    }
    if let Some(mode) = args.c14n {
        ctx = ctx.with_c14n(Arc::new(mode));
    }
    if let Some(hash) = args.data_hash {
        ctx.data.hash = hash;
    }
    if let Some(hash) = args.props_hash {
        ctx.properties.hash = hash;
    }
    if let Some(mode) = args.props_c14n {
        ctx.properties.c14n = Arc::new(mode);
    }
    let data_mode = args.data_c14n.or(args.c14n).unwrap_or(C14nMode::Exclusive);
    ctx.data.c14n = data_canonicalizer(data_mode, &args.inclusive_ns)?;

    if let Some(id) = &args.reference_id {
        ctx.data.reference_uri = format!("#{id}");
    }
    ctx.data.enveloped = !args.detached;

    ctx.use_signature_id = args.unique_ids || args.signature_id.is_some();
    ctx.signature_id = args.signature_id;
    if let Some(time) = &args.signing_time {
        ctx.properties.signing_time = Some(parse_signing_time(time)?);
    }
    ctx.dsig_prefix = args.ds_prefix.clone();

    ctx.validate()?;
    Ok(ctx)
}

fn data_canonicalizer(mode: C14nMode, prefixes: &[String]) -> Result<Arc<dyn Canonicalizer>, Error> {
    if prefixes.is_empty() {
        return Ok(Arc::new(mode));
    }
    if !mode.is_exclusive() {
        return Err(Error::Configuration(format!(
            "--inclusive-ns requires exclusive canonicalization, not {mode}"
        )));
    }
    Ok(Arc::new(ExclusiveCanonicalizer {
        with_comments: mode.with_comments(),
        inclusive_prefixes: prefixes.to_vec(),
    }))
}

fn parse_signing_time(s: &str) -> Result<DateTime<Utc>, Error> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| Error::Configuration(format!("invalid signing time {s:?}: {e}")))
}

fn cmd_info() -> Result<(), Error> {
    println!("Tornvik: XAdES-BES signatures for XML documents");
    println!();
    println!("Supported digest algorithms:");
    for hash in HashAlgorithm::ALL {
        println!("  {:<8} {}", hash.name(), hash.digest_uri());
    }
    println!();
    println!("Supported signature algorithms:");
    for hash in HashAlgorithm::ALL {
        println!("  RSA PKCS#1 v1.5 with {:<8} {}", hash.name(), hash.signature_uri());
    }
    println!();
    println!("Supported canonicalization:");
    for mode in C14nMode::ALL {
        println!("  {:<22} {}", mode.name(), mode.uri());
    }
    println!();
    println!("Supported key formats:");
    println!("  RSA private keys: PKCS#8, PKCS#1 (PEM or DER)");
    println!("  Certificates: X.509 (PEM or DER), PEM chains");
    Ok(())
}

// ── Utility functions ────────────────────────────────────────────────

fn read_file(path: &Path) -> Result<String, Error> {
    std::fs::read_to_string(path)
        .map_err(|e| Error::Io(std::io::Error::new(e.kind(), format!("{}: {e}", path.display()))))
}

fn write_output(path: Option<PathBuf>, data: &[u8]) -> Result<(), Error> {
    match path {
        Some(p) => std::fs::write(&p, data)
            .map_err(|e| Error::Io(std::io::Error::new(e.kind(), format!("{}: {e}", p.display())))),
        None => {
            use std::io::Write;
            std::io::stdout().write_all(data).map_err(Error::from)
        }
    }
}
