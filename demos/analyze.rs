//! Analyze a weighted voting game.
//!
//! Run with:
//! ```bash
//! cargo run --example analyze -- --quota 5 --weights 3,2,2,1
//! ```

use std::time::Instant;

use clap::Parser;
use simple_games::game::{Family, Property, SimpleGame};
use simple_games::lp::WeightednessModel;

#[derive(Debug, Parser)]
#[command(author, version, about = "Analyze a weighted voting game")]
struct Cli {
    /// Quota of the game
    #[arg(long)]
    quota: i64,

    /// Comma-separated player weights
    #[arg(long, value_delimiter = ',', required = true)]
    weights: Vec<i64>,

    /// Comma-separated number of players per weight (default: one each)
    #[arg(long, value_delimiter = ',')]
    sizes: Vec<usize>,

    /// List the minimal winning coalitions
    #[arg(long)]
    list: bool,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: simplelog::LevelFilter,
}

fn fmt_index(values: &[f64]) -> String {
    values.iter().map(|x| format!("{:.4}", x)).collect::<Vec<_>>().join(" ")
}

fn fmt_verdict(v: Option<bool>) -> &'static str {
    match v {
        Some(true) => "yes",
        Some(false) => "no",
        None => "unknown",
    }
}

fn build_game(cli: &Cli) -> color_eyre::Result<SimpleGame> {
    if cli.sizes.is_empty() {
        return Ok(SimpleGame::weighted(cli.quota, &cli.weights)?);
    }
    if cli.sizes.len() != cli.weights.len() {
        color_eyre::eyre::bail!("{} sizes given for {} weights", cli.sizes.len(), cli.weights.len());
    }

    let mut game = SimpleGame::new();
    let mut classes = Vec::new();
    for &size in &cli.sizes {
        classes.push(game.add_player_class(size, None)?);
    }
    let weights: Vec<_> = classes.iter().zip(&cli.weights).map(|(c, &w)| (c, w)).collect();
    game.create_rule(Some("rule"))?.set(cli.quota, &weights)?;
    Ok(game)
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    simplelog::TermLogger::init(
        cli.log_level,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let time_total = Instant::now();

    let game = build_game(&cli)?;
    game.register_observer(Box::new(|p: Property| log::debug!("available: {}", p)));
    println!("{}", game);

    let mgr = game.manager();
    let win = game.winning()?;
    println!("winning diagram: {} nodes", mgr.size(win));

    for family in Family::ALL {
        println!("{:>24}: {}", family, game.count(family)?);
    }

    if cli.list {
        println!("minimal winning coalitions:");
        for s in game.coalitions(Family::MinimalWinning)? {
            println!("  {:?}", s);
        }
    }

    println!("complete:    {}", game.is_complete()?);
    println!("directed:    {}", game.is_directed()?);
    println!("homogeneous: {}", fmt_verdict(game.is_homogeneous()?));
    println!("weighted:    {}", fmt_verdict(game.is_weighted()?));
    println!("proper:      {}", game.is_proper()?);
    println!("strong:      {}", game.is_strong()?);
    println!("dummies:     {:?}", game.dummies()?);
    println!("vetoers:     {:?}", game.vetoers()?);

    if let Some(nat) = game.natural_representation()? {
        println!("natural representation: {}", nat.wvg);
    }
    if game.is_consecutive()? {
        println!("minimal winning models: {:?}", game.models(Family::MinimalWinning)?);
    }

    println!("Shapley-Shubik:  {}", fmt_index(&game.shapley_shubik()?));
    println!("Banzhaf:         {}", fmt_index(&game.banzhaf_normalized()?));
    println!("Holler-Packel:   {}", fmt_index(&game.holler_packel_normalized()?));
    println!("Deegan-Packel:   {}", fmt_index(&game.deegan_packel()?));
    println!("shift power:     {}", fmt_index(&game.shift_power()?));

    let prog = WeightednessModel::default().build(&game)?;
    println!(
        "weightedness LP: {} variables, {} constraints",
        prog.lp.vars().len(),
        prog.lp.constraints().len()
    );

    println!("total time: {:.2?}", time_total.elapsed());
    Ok(())
}
