use crate::analysis::players::{FinishTally, PlayerStat};
use crate::analysis::{BuildMatch, BuildStat, MatchOutcome, PartStat};
use crate::models::{FinishType, PartType};
use colored::*;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct PartRow {
    #[tabled(rename = "#")]
    rank: String,
    name: String,
    detail: String,
    usage: String,
    wins: String,
    losses: String,
    #[tabled(rename = "win rate")]
    win_rate: String,
    wilson: String,
}

#[derive(Tabled)]
struct BuildRow {
    build: String,
    user: String,
    wins: String,
    losses: String,
    #[tabled(rename = "win rate")]
    win_rate: String,
    wilson: String,
}

#[derive(Tabled)]
struct BuildMatchRow {
    result: String,
    opponent: String,
    #[tabled(rename = "opponent's bey")]
    opponent_bey: String,
    #[tabled(rename = "finish type")]
    finish: String,
}

#[derive(Tabled)]
struct PlayerRow {
    player: String,
    record: String,
    #[tabled(rename = "win rate")]
    win_rate: String,
    points: String,
    #[tabled(rename = "pts/match")]
    points_per_match: String,
    #[tabled(rename = "best bey")]
    best_bey: String,
}

#[derive(Tabled)]
struct BeyFinishRow {
    bey: String,
    spin: String,
    burst: String,
    over: String,
    extreme: String,
    total: String,
    points: String,
}

fn percent(rate: f64) -> String {
    format!("{:.1}%", rate * 100.0)
}

fn outcome_cell(result: MatchOutcome) -> String {
    match result {
        MatchOutcome::Win => "Win".green().to_string(),
        MatchOutcome::Loss => "Loss".red().to_string(),
    }
}

fn print_table<T: Tabled>(rows: Vec<T>) {
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{}", table);
}

pub fn display_part_table(part_type: PartType, rows: &[PartStat]) {
    println!("\n{}", format!("📊 {}", part_type.title()).bold().cyan());
    println!("{}\n", "=".repeat(60).cyan());

    if rows.is_empty() {
        println!("{}", format!("No {} recorded in these matches", part_type.title().to_lowercase()).yellow());
        return;
    }

    let rows: Vec<PartRow> = rows
        .iter()
        .enumerate()
        .map(|(idx, stat)| PartRow {
            rank: format!("#{}", idx + 1),
            name: stat.key.clone(),
            detail: stat.detail.clone(),
            usage: stat.used.to_string(),
            wins: stat.wins.to_string(),
            losses: stat.losses.to_string(),
            win_rate: percent(stat.win_rate),
            wilson: format!("{:.3}", stat.wilson_score),
        })
        .collect();
    print_table(rows);
}

pub fn display_meta_summary(matches: usize, unparsed: usize) {
    println!(
        "{} {} matches analysed",
        "📈 Overall:".bold(),
        matches.to_string().green()
    );
    if let Some(note) = skipped_combos_note(unparsed) {
        println!("{} {}", "⚠️".yellow(), note);
    }
}

fn skipped_combos_note(unparsed: usize) -> Option<String> {
    (unparsed > 0).then(|| format!("{} combos could not be split into parts and were skipped", unparsed))
}

pub fn display_builds(part_type: PartType, part_key: &str, builds: &[BuildStat]) {
    println!(
        "\n{}",
        format!("🎯 Builds using {} ({})", part_key, part_type).bold().cyan()
    );
    println!("{}\n", "=".repeat(60).cyan());

    if builds.is_empty() {
        println!("{}", "No builds found for this part".yellow());
        return;
    }

    let rows: Vec<BuildRow> = builds
        .iter()
        .map(|b| BuildRow {
            build: b.build.clone(),
            user: b.player.clone(),
            wins: b.wins.to_string(),
            losses: b.losses.to_string(),
            win_rate: percent(b.win_rate),
            wilson: format!("{:.3}", b.wilson_score),
        })
        .collect();
    print_table(rows);
    println!("\n• Run `matches --build \"<build>\" --player <user>` to list the games of one build\n");
}

pub fn display_build_matches(build: &str, player: &str, rows: &[BuildMatch]) {
    println!(
        "\n{}",
        format!("⚔️  Matches for {} by {}", build, player).bold().cyan()
    );
    println!("{}\n", "=".repeat(60).cyan());

    if rows.is_empty() {
        println!("{}", "No matches found for this build and player".yellow());
        return;
    }

    let wins = rows.iter().filter(|r| r.result == MatchOutcome::Win).count();
    println!(
        "{} {} W / {} L\n",
        "📈 Record:".bold(),
        wins.to_string().green(),
        (rows.len() - wins).to_string().red()
    );

    let rows: Vec<BuildMatchRow> = rows
        .iter()
        .map(|r| BuildMatchRow {
            result: outcome_cell(r.result),
            opponent: r.opponent.clone(),
            opponent_bey: r.opponent_bey.clone(),
            finish: r.finish.clone(),
        })
        .collect();
    print_table(rows);
    println!();
}

pub fn display_player_summary(players: &[PlayerStat]) {
    println!("\n{}", "👥 PLAYER STANDINGS".bold().cyan());
    println!("{}\n", "=".repeat(60).cyan());

    if players.is_empty() {
        println!("{}", "No players found for this tournament".yellow());
        return;
    }

    let rows: Vec<PlayerRow> = players
        .iter()
        .map(|p| PlayerRow {
            player: p.name.clone(),
            record: format!("{}-{}", p.wins, p.losses),
            win_rate: percent(p.win_rate()),
            points: p.points.to_string(),
            points_per_match: format!("{:.2}", p.points_per_match()),
            best_bey: p
                .most_valuable_bey()
                .map(|b| b.bey.clone())
                .unwrap_or_else(|| "N/A".to_string()),
        })
        .collect();
    print_table(rows);
    println!();
}

pub fn display_player_card(player: &PlayerStat) {
    println!("\n{}", format!("🎮 {}", player.name).bold().cyan());
    println!("{}\n", "=".repeat(60).cyan());

    println!(
        "{} {:.1}% ({} of {}), {:.2} pts/match",
        "Win rate:".bold(),
        player.win_rate() * 100.0,
        player.wins,
        player.games(),
        player.points_per_match()
    );
    match player.most_valuable_bey() {
        Some(bey) => println!(
            "{} {} ({} wins, {} pts)",
            "Most valuable bey:".bold(),
            bey.bey,
            bey.wins,
            bey.points
        ),
        None => println!("{} N/A", "Most valuable bey:".bold()),
    }
    let label = |f: Option<&FinishType>| f.map(|f| f.label().to_string()).unwrap_or_else(|| "N/A".to_string());
    println!("{} {}", "Wins mostly by:".bold(), label(player.win_finishes.top()));
    println!("{} {}\n", "Loses mostly to:".bold(), label(player.loss_finishes.top()));

    if !player.declared_beys.is_empty() {
        println!("{} {}\n", "Declared beys:".bold(), player.declared_beys.join(", "));
    }

    // declared beys first, then anything else the player actually used
    let mut names: Vec<&str> = player.declared_beys.iter().map(String::as_str).collect();
    for b in &player.beys {
        if !names.contains(&b.bey.as_str()) {
            names.push(&b.bey);
        }
    }

    let count = |t: Option<&FinishTally>, f: &FinishType| t.map_or(0, |t| t.get(f)).to_string();

    println!("{}", "Wins by finish".bold().green());
    let win_rows: Vec<BeyFinishRow> = names
        .iter()
        .map(|name| {
            let b = player.bey(name);
            let tally = b.map(|b| &b.win_finishes);
            BeyFinishRow {
                bey: name.to_string(),
                spin: count(tally, &FinishType::Spin),
                burst: count(tally, &FinishType::Burst),
                over: count(tally, &FinishType::Over),
                extreme: count(tally, &FinishType::Extreme),
                total: b.map_or(0, |b| b.wins).to_string(),
                points: b.map_or(0, |b| b.points).to_string(),
            }
        })
        .collect();
    print_table(win_rows);

    println!("\n{}", "Losses by finish".bold().red());
    let loss_rows: Vec<BeyFinishRow> = names
        .iter()
        .map(|name| {
            let b = player.bey(name);
            let tally = b.map(|b| &b.loss_finishes);
            BeyFinishRow {
                bey: name.to_string(),
                spin: count(tally, &FinishType::Spin),
                burst: count(tally, &FinishType::Burst),
                over: count(tally, &FinishType::Over),
                extreme: count(tally, &FinishType::Extreme),
                total: b.map_or(0, |b| b.losses).to_string(),
                points: b.map_or(0, |b| b.points_given()).to_string(),
            }
        })
        .collect();
    print_table(loss_rows);

    println!("\n{}", "Match log".bold());
    let log_rows: Vec<BuildMatchRow> = player
        .matches
        .iter()
        .map(|m| BuildMatchRow {
            result: outcome_cell(m.result),
            opponent: m.opponent.clone(),
            opponent_bey: m.opponent_bey.clone(),
            finish: m.finish.to_string(),
        })
        .collect();
    print_table(log_rows);
    println!();
}

pub fn display_error(error: &str) {
    eprintln!("{} {}", "❌ Error:".red().bold(), error);
}

pub fn display_info(message: &str) {
    println!("{} {}", "ℹ️".cyan(), message);
}

pub fn display_success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skipped_combos_note() {
        assert_eq!(skipped_combos_note(0), None);
        let note = skipped_combos_note(3).unwrap();
        assert!(note.starts_with("3 combos could not be split into parts"));
        assert!(!note.contains("bit"));
    }
}
