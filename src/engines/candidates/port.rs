use crate::error::Result;

/// Boundary to the service that writes strategy source text
pub trait CandidateGenerator {
    /// New strategy source from a natural-language prompt
    fn generate(&mut self, prompt: &str) -> Result<String>;

    /// Refine an existing strategy according to `prompt`
    fn rewrite(&mut self, existing_source: &str, prompt: &str) -> Result<String>;
}

impl<G: CandidateGenerator + ?Sized> CandidateGenerator for Box<G> {
    fn generate(&mut self, prompt: &str) -> Result<String> {
        (**self).generate(prompt)
    }

    fn rewrite(&mut self, existing_source: &str, prompt: &str) -> Result<String> {
        (**self).rewrite(existing_source, prompt)
    }
}
