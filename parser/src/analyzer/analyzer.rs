use crate::extractor::LogEvent;

pub trait Analyzer {
    fn process(&mut self, event: &LogEvent);
    fn finish(&mut self);
}
