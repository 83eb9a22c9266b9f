use crate::engines::generation::genome::Genome;
use rand::seq::index;
use rand::Rng;

/// Number of genomes that survive a round unchanged: at least one, at most all
pub fn elite_count(population_size: usize, elitism_rate: f64) -> usize {
    let count = (population_size as f64 * elitism_rate).floor() as usize;
    count.max(1).min(population_size)
}

/// Elite selection: two distinct parents drawn uniformly from the elite slice.
///
/// Parents come from the elites only, never from the rest of the
/// population. With a single elite it is used as both parents.
pub fn select_elite_parents<'a, R: Rng>(
    elites: &'a [Genome],
    rng: &mut R,
) -> (&'a Genome, &'a Genome) {
    if elites.len() < 2 {
        return (&elites[0], &elites[0]);
    }
    let picked = index::sample(rng, elites.len(), 2);
    (&elites[picked.index(0)], &elites[picked.index(1)])
}

/// Single-point crossover at the character midpoint of the first parent.
///
/// The child is the first half of `parent1` followed by everything in
/// `parent2` from that same character offset on. The split is textual,
/// so the child can be syntactically invalid.
pub fn midpoint_crossover(parent1: &str, parent2: &str) -> String {
    let cut = parent1.chars().count() / 2;
    let head = char_prefix(parent1, cut);
    let tail = &parent2[char_prefix(parent2, cut).len()..];

    let mut child = String::with_capacity(head.len() + tail.len());
    child.push_str(head);
    child.push_str(tail);
    child
}

/// Mutation: append the marker to the child text
pub fn append_mutation(mut source_text: String, marker: &str) -> String {
    source_text.push_str(marker);
    source_text
}

/// Leading `chars` characters of `text`, or all of it when shorter
fn char_prefix(text: &str, chars: usize) -> &str {
    match text.char_indices().nth(chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}
