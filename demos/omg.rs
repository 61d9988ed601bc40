//! Streaming "omg" detector.
//!
//! Feeds a sentence one character at a time and reports every "omg" as soon
//! as its last letter arrives.
//!
//! Run with: cargo run --example omg
//! Set RUST_LOG=dfsm=trace to see every feed.

use dfsm::{MachineBuilder, MachineError};

fn main() -> Result<(), MachineError> {
    tracing_subscriber::fmt::init();

    println!("=== omg detector ===\n");

    let mut machine = MachineBuilder::<&str, char, usize>::new()
        .initial("x")
        .state("o")
        .state("m")
        .terminal("g")
        .transition("x", "o", 'o')
        .transition("o", "o", 'o')
        .transition("o", "m", 'm')
        .transition("m", "g", 'g')
        .transition("g", "o", 'o')
        .wildcard("x", "x")
        .wildcard("o", "x")
        .wildcard("m", "x")
        .wildcard("g", "x")
        .build()?;

    machine.bind_enter_terminal(|event| {
        if let Some(position) = event.payload() {
            println!("  omg detected ending at position {position}");
        }
    });

    let text = "Hey dude omg! That's awesome. omg!";
    println!("Input: {text:?}\n");

    let matched = machine.feed_many_with(text.chars(), 0..text.chars().count())?;

    println!();
    println!("Characters fed:     {}", machine.feed_count());
    println!("Transitions taken:  {}", machine.transition_count());
    println!(
        "Unmatched:          {}",
        matched.iter().filter(|m| !**m).count()
    );
    println!("Final state:        {:?}", machine.current_state());

    Ok(())
}
