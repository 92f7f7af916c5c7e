//! World validation command implementation.

use std::path::Path;

use conquest::World;
use conquest::game::DEFAULT_STARTING_TROOPS;

use super::CliError;

/// Execute the validate command.
///
/// # Errors
///
/// Returns an error if the world file cannot be read or is invalid.
pub(crate) fn execute(path: &Path) -> Result<(), CliError> {
    println!("Validating: {}", path.display());
    println!();

    let world = match World::load(path) {
        Ok(world) => {
            print_check("World definition", true);
            world
        }
        Err(e) => {
            print_check("World definition", false);
            return Err(CliError::new(format!("Invalid world: {e}")));
        }
    };

    let playable = world.len() >= 2;
    print_check("At least two territories", playable);
    let draftable =
        u32::try_from(world.len()).is_ok_and(|n| n.div_ceil(2) <= DEFAULT_STARTING_TROOPS);
    print_check("Starting troops cover every territory", draftable);

    let borders: usize = world.territories().map(|(_, t)| t.neighbours().len()).sum();

    println!();
    println!("Summary:");
    println!("  Territories:  {}", world.len());
    println!("  Borders:      {}", borders / 2);
    println!("  Regions:");
    for (_, region) in world.regions() {
        println!(
            "    {:<16} {:>2} territories, +{} troops",
            region.name(),
            region.members().len(),
            region.bonus()
        );
    }

    if !playable || !draftable {
        return Err(CliError::new("World cannot host a two-player game"));
    }

    println!();
    println!("Validation successful!");

    Ok(())
}

fn print_check(name: &str, ok: bool) {
    let status = if ok { "OK" } else { "FAILED" };
    let symbol = if ok { "✓" } else { "✗" };
    println!("  {symbol} {name}: {status}");
}
