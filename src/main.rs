use clap::{
    crate_authors, crate_description, crate_name, crate_version, App, Arg, ArgMatches,
};
use graphzip::{
    compressor::{compress_shards, Compressor, Config, Stats},
    dictionary::{self, DictionaryEntry},
    front_end::{GraphReader, GraphSequence},
    output::write_dictionary,
};
use log::info;
use std::{
    error::Error,
    fs::File,
    io::{self, BufWriter, Write},
};

fn parse_config(matches: &ArgMatches) -> Result<Config, Box<dyn Error>> {
    let mut config = Config::new()
        .with_directed(matches.is_present("directed"))
        .with_add_implicit_vertices(!matches.is_present("strict-vertices"))
        .with_label_history_per_file(matches.is_present("label-history-per-file"));
    if let Some(alpha) = matches.value_of("alpha") {
        config = config.with_alpha(alpha.parse()?);
    }
    if let Some(theta) = matches.value_of("theta") {
        config = config.with_theta(theta.parse()?);
    }
    config.validate()?;
    Ok(config)
}

fn handle_shards(
    matches: &ArgMatches,
    config: &Config,
) -> Result<(Vec<DictionaryEntry>, Stats), Box<dyn Error>> {
    let num_files = matches.value_of("num-files").unwrap().parse()?;
    let sequence = GraphSequence::new(matches.value_of("GRAPH").unwrap(), num_files)?;
    let shards = sequence
        .paths()
        .into_iter()
        .map(GraphReader::open)
        .collect::<graphzip::Result<Vec<_>>>()?;
    let (store, stats) = compress_shards(config, shards)?;
    if let Some(path) = matches.value_of("save-state") {
        dictionary::save_state(path, &store, config.directed(), &stats.counters())?;
    }
    Ok((store.snapshot(), stats))
}

fn handle_stream(
    matches: &ArgMatches,
    config: Config,
) -> Result<(Vec<DictionaryEntry>, Stats), Box<dyn Error>> {
    let mut compressor = match matches.value_of("import-state") {
        Some(path) => Compressor::import_state(config, path)?,
        None => Compressor::new(config)?,
    };
    let graph = matches.value_of("GRAPH").unwrap();
    match matches.value_of("num-files") {
        Some(num_files) => {
            compressor.compress(&mut GraphSequence::new(graph, num_files.parse()?)?)?
        }
        None => compressor.compress(&mut GraphReader::open(graph)?)?,
    }
    if let Some(path) = matches.value_of("save-state") {
        compressor.save_state(path)?;
    }
    Ok((compressor.snapshot(), compressor.stats().clone()))
}

fn main() -> Result<(), Box<dyn Error>> {
    let matches = App::new(crate_name!())
        .about(crate_description!())
        .author(crate_authors!())
        .version(crate_version!())
        .after_help(
            r"GRAPH is a .graph file, or with --num-files a directory holding
1.graph .. N.graph. Each dictionary line reads:

  <frequency> <size> <score> v 0 <label> ... ; e <u> <v> <label> ...
",
        )
        .arg(Arg::with_name("GRAPH").required(true))
        .arg(
            Arg::with_name("num-files")
                .help("Reads GRAPH/1.graph .. GRAPH/N.graph as one stream")
                .short("n")
                .long("num-files")
                .value_name("N")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("alpha")
                .help("Number of edges per batch [default: 10]")
                .short("a")
                .long("alpha")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("theta")
                .help("Maximum number of dictionary entries [default: unbounded]")
                .short("t")
                .long("theta")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("directed")
                .help("Treats edges as arcs")
                .short("d")
                .long("directed")
                .takes_value(false),
        )
        .arg(
            Arg::with_name("strict-vertices")
                .help("Fails on edges between undeclared vertices")
                .long("strict-vertices")
                .takes_value(false),
        )
        .arg(
            Arg::with_name("label-history-per-file")
                .help("Forgets the declared vertices at the end of every file")
                .long("label-history-per-file")
                .takes_value(false),
        )
        .arg(
            Arg::with_name("shard-files")
                .help("Compresses the numbered files in parallel and merges the dictionaries")
                .long("shard-files")
                .takes_value(false)
                .requires_all(&["num-files", "label-history-per-file"])
                .conflicts_with("import-state"),
        )
        .arg(
            Arg::with_name("import-state")
                .help("Starts from a dictionary saved with --save-state")
                .long("import-state")
                .value_name("DB")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("save-state")
                .help("Saves the final dictionary to an SQLite database")
                .long("save-state")
                .value_name("DB")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("top")
                .help("Prints only the K most frequent patterns")
                .long("top")
                .value_name("K")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("output")
                .help("Writes the dictionary to FILE instead of stdout")
                .short("o")
                .long("output")
                .value_name("FILE")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("stats")
                .help("Prints run statistics to stderr")
                .short("s")
                .long("stats")
                .takes_value(false),
        )
        .arg(
            Arg::with_name("verbose")
                .help("Logs every batch")
                .short("v")
                .long("verbose")
                .takes_value(false),
        )
        .get_matches();
    let level = if matches.is_present("verbose") {
        "debug"
    } else {
        "warn"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let config = parse_config(&matches)?;
    let top = match matches.value_of("top") {
        Some(top) => Some(top.parse()?),
        None => None,
    };
    let (entries, stats) = if matches.is_present("shard-files") {
        handle_shards(&matches, &config)?
    } else {
        handle_stream(&matches, config)?
    };
    match matches.value_of("output") {
        Some(path) => {
            write_dictionary(&mut BufWriter::new(File::create(path)?), &entries, top)?;
            info!("wrote {} entries to {}", entries.len(), path);
        }
        None => write_dictionary(&mut BufWriter::new(io::stdout().lock()), &entries, top)?,
    }
    if matches.is_present("stats") {
        writeln!(io::stderr(), "{}", stats)?;
        writeln!(io::stderr(), "entries: {}", entries.len())?;
    }
    Ok(())
}
