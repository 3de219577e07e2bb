// Repetition counter - counts validated TOP -> BOTTOM -> TOP cycles
//
// Reaching TOP alone never counts. A BOTTOM must have been entered from
// DESCENDING since the last counted TOP, and TOP must be entered from
// ASCENDING. Oscillations near the top therefore never add repetitions.

use super::phase::RepetitionPhase;

#[derive(Debug, Clone, Default)]
pub struct RepetitionCounter {
    bottom_count: u32,
    top_count: u32,
    last_phase: Option<RepetitionPhase>,
}

impl RepetitionCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Observe the smoothed phase for one frame
    ///
    /// # Returns
    /// `true` when this frame completed a repetition
    pub fn observe(&mut self, phase: RepetitionPhase) -> bool {
        let previous = self.last_phase.replace(phase);
        let mut completed = false;

        match (previous, phase) {
            (Some(RepetitionPhase::Descending), RepetitionPhase::Bottom) => {
                self.bottom_count += 1;
            }
            (Some(RepetitionPhase::Ascending), RepetitionPhase::Top)
                if self.bottom_count > self.top_count =>
            {
                self.top_count += 1;
                completed = true;
            }
            _ => {}
        }

        completed
    }

    /// Completed repetitions
    pub fn count(&self) -> u32 {
        self.top_count
    }

    pub fn bottoms_reached(&self) -> u32 {
        self.bottom_count
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
