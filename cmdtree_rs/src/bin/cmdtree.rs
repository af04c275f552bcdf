//! Demo shell for the dispatch engine.
//!
//! Registers a small inventory-flavored command set, then dispatches the
//! process arguments one-shot, or — with no arguments — runs a `cmd> `
//! prompt loop until `exit` or EOF. Per-line exit codes are ignored in
//! the loop; the shell itself reports 0.

use std::collections::BTreeMap;
use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

use anyhow::Result;
use cmdtree::{ArgMap, ArgValue, DispatchFailure, Dispatcher, help};

struct Slot {
    name: String,
    count: i64,
}

fn seed_slots() -> BTreeMap<i64, Slot> {
    BTreeMap::from([
        (
            1,
            Slot {
                name: "bolt".into(),
                count: 250,
            },
        ),
        (
            2,
            Slot {
                name: "washer".into(),
                count: 500,
            },
        ),
        (
            7,
            Slot {
                name: "gasket".into(),
                count: 25,
            },
        ),
    ])
}

fn greet(args: &ArgMap) -> i32 {
    match args.get("name").and_then(ArgValue::as_str) {
        Some(name) => {
            println!("hello {}", name);
            0
        }
        None => 1,
    }
}

fn render_listing(cli: &Dispatcher) -> String {
    let mut out = String::from("loaded commands:\n");
    for entry in cli.commands() {
        let marker = if entry.hidden { " (hidden)" } else { "" };
        out.push_str(&format!("{:>24} : {}{}\n", entry.path, entry.help, marker));
    }
    out.push_str("loaded options:\n");
    for entry in cli.options() {
        let marker = if entry.hidden { " (hidden)" } else { "" };
        out.push_str(&format!(
            "{:>24} : {}{}\n",
            entry.display, entry.help, marker
        ));
    }
    out.push_str("end of commands\n");
    out
}

fn render_listing_json(cli: &Dispatcher) -> Result<String> {
    let snapshot = serde_json::json!({
        "commands": cli.commands(),
        "options": cli.options(),
    });
    Ok(serde_json::to_string_pretty(&snapshot)?)
}

fn build_dispatcher() -> Result<Dispatcher> {
    let slots = Arc::new(Mutex::new(seed_slots()));
    let strict = Arc::new(AtomicBool::new(false));
    let verbose = Arc::new(AtomicBool::new(false));
    let listing: Arc<OnceLock<String>> = Arc::new(OnceLock::new());
    let listing_json: Arc<OnceLock<String>> = Arc::new(OnceLock::new());

    let mut cli = Dispatcher::new();
    cli.set_help_keywords(&["?", "-h", "--help"]);

    // A line made of flags alone (e.g. `--version`) never reaches a bound
    // command node; treat that as fine instead of complaining.
    cli.set_bad_command_handler(|bad| {
        if matches!(bad.failure, DispatchFailure::Incomplete)
            && !bad.input.is_empty()
            && bad.input.iter().all(|t| t.starts_with('-'))
        {
            return 0;
        }
        help::print_bad_command(bad)
    });

    cli.register_command(
        &["show", "version"],
        |_args| {
            println!("cmdtree {}", env!("CARGO_PKG_VERSION"));
            0
        },
        ArgMap::new(),
        "print the engine version",
        false,
    )?;

    let slots_inv = Arc::clone(&slots);
    let verbose_inv = Arc::clone(&verbose);
    cli.register_command(
        &["show", "inventory"],
        move |_args| {
            let slots = slots_inv.lock().unwrap();
            for (id, slot) in slots.iter() {
                println!("{:>4}  {:<12} x{}", id, slot.name, slot.count);
            }
            if verbose_inv.load(Ordering::Relaxed) {
                let total: i64 = slots.values().map(|s| s.count).sum();
                println!("total {} items in {} slots", total, slots.len());
            }
            0
        },
        ArgMap::new(),
        "list every stocked slot",
        false,
    )?;

    let slots_show = Arc::clone(&slots);
    cli.register_command(
        &["show", "slot", "@id(int)"],
        move |args| {
            let id = match args.get("id").and_then(ArgValue::as_int) {
                Some(id) => id,
                None => return 1,
            };
            match slots_show.lock().unwrap().get(&id) {
                Some(slot) => {
                    println!("{:>4}  {:<12} x{}", id, slot.name, slot.count);
                    0
                }
                None => {
                    eprintln!("no such slot: {}", id);
                    1
                }
            }
        },
        ArgMap::new(),
        "print one inventory slot",
        false,
    )?;

    let slots_put = Arc::clone(&slots);
    cli.register_command(
        &["put", "@id(int)", "@name", "@count(int)"],
        move |args| {
            let (Some(id), Some(name), Some(count)) = (
                args.get("id").and_then(ArgValue::as_int),
                args.get("name").and_then(ArgValue::as_str),
                args.get("count").and_then(ArgValue::as_int),
            ) else {
                return 1;
            };
            slots_put.lock().unwrap().insert(
                id,
                Slot {
                    name: name.to_string(),
                    count,
                },
            );
            println!("slot {} <- {} x{}", id, name, count);
            0
        },
        ArgMap::new(),
        "stock a slot: put <id> <name> <count>",
        false,
    )?;

    let slots_drop = Arc::clone(&slots);
    let strict_drop = Arc::clone(&strict);
    cli.register_command(
        &["drop", "@ids(int)..."],
        move |args| {
            let ids = match args.get("ids").and_then(ArgValue::as_list) {
                Some(ids) => ids,
                None => return 1,
            };
            let mut slots = slots_drop.lock().unwrap();
            let mut dropped = 0;
            for id in ids.iter().filter_map(ArgValue::as_int) {
                if slots.remove(&id).is_some() {
                    dropped += 1;
                }
            }
            println!("dropped {} of {} slot(s)", dropped, ids.len());
            if strict_drop.load(Ordering::Relaxed) && dropped < ids.len() {
                eprintln!("{} slot(s) missing", ids.len() - dropped);
                return 1;
            }
            0
        },
        ArgMap::new(),
        "remove slots: drop <id> [id ...]",
        false,
    )?;

    let strict_toggle = Arc::clone(&strict);
    cli.register_command(
        &["toggle", "strict", "@enable(bool)"],
        move |args| {
            let enable = args
                .get("enable")
                .and_then(ArgValue::as_bool)
                .unwrap_or(false);
            strict_toggle.store(enable, Ordering::Relaxed);
            println!("strict mode {}", if enable { "on" } else { "off" });
            0
        },
        ArgMap::new(),
        "fail drops that name unknown slots",
        false,
    )?;

    let mut greet_defaults = ArgMap::new();
    greet_defaults.insert("name".into(), ArgValue::Str("world".into()));
    cli.register_command(&["greet"], greet, greet_defaults, "greet the world", false)?;
    cli.register_command(
        &["greet", "@name"],
        greet,
        ArgMap::new(),
        "greet someone by name",
        false,
    )?;

    let slots_wipe = Arc::clone(&slots);
    cli.register_command(
        &["wipe", "all"],
        move |_args| {
            slots_wipe.lock().unwrap().clear();
            println!("inventory wiped");
            0
        },
        ArgMap::new(),
        "clear every slot",
        true,
    )?;

    let listing_dump = Arc::clone(&listing);
    cli.register_command(
        &["dump"],
        move |_args| match listing_dump.get() {
            Some(text) => {
                print!("{}", text);
                0
            }
            None => 1,
        },
        ArgMap::new(),
        "list registered commands and options",
        false,
    )?;

    let listing_dump_json = Arc::clone(&listing_json);
    cli.register_command(
        &["dump", "json"],
        move |_args| match listing_dump_json.get() {
            Some(text) => {
                println!("{}", text);
                0
            }
            None => 1,
        },
        ArgMap::new(),
        "same listing as JSON",
        false,
    )?;

    let verbose_opt = Arc::clone(&verbose);
    cli.register_option(
        &["-v", "--verbose"],
        move |_args| {
            verbose_opt.store(true, Ordering::Relaxed);
            0
        },
        ArgMap::new(),
        "add totals to inventory output",
        false,
    )?;

    cli.register_option(
        &["--version"],
        |_args| {
            println!("cmdtree {}", env!("CARGO_PKG_VERSION"));
            0
        },
        ArgMap::new(),
        "print version",
        false,
    )?;

    // Snapshot the listings only after everything above is in, so `dump`
    // sees itself too.
    let _ = listing.set(render_listing(&cli));
    let _ = listing_json.set(render_listing_json(&cli)?);
    Ok(cli)
}

fn repl(cli: &Dispatcher) -> i32 {
    println!("type '?' for commands, 'exit' to quit");
    let mut input = io::stdin().lock();
    let mut line = String::new();
    loop {
        print!("cmd> ");
        io::stdout().flush().ok();
        line.clear();
        match input.read_line(&mut line) {
            Ok(0) => break,
            Ok(_) => {}
            Err(err) => {
                eprintln!("read error: {}", err);
                return 1;
            }
        }
        if line.trim_start().starts_with("exit") {
            break;
        }
        cli.dispatch_line(&line);
    }
    0
}

fn exit_code(code: i32) -> ExitCode {
    ExitCode::from(code.clamp(0, 255) as u8)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = match build_dispatcher() {
        Ok(cli) => cli,
        Err(err) => {
            eprintln!("command registration failed: {}", err);
            return ExitCode::FAILURE;
        }
    };

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() {
        return exit_code(repl(&cli));
    }
    let tokens: Vec<&str> = args.iter().map(String::as_str).collect();
    exit_code(cli.dispatch(&tokens))
}
