use geo::{Distance, Haversine, Point};

use super::AddressAssembler;
use crate::model::{Address, CandidateRecord};

/// Identity of a street candidate, compared against the next candidate in the list.
#[derive(Debug, Clone)]
struct StreetKey {
    name: String,
    is_in: Option<String>,
    location: Point<f64>,
}

impl StreetKey {
    fn of(candidate: &CandidateRecord) -> Self {
        Self {
            name: candidate.name.clone(),
            is_in: candidate.qualified_is_in(),
            location: candidate.location(),
        }
    }

    /// Same name, same known locality and no further apart than `max_distance_m`.
    fn continues(&self, candidate: &CandidateRecord, max_distance_m: f64) -> bool {
        if self.name.to_lowercase() != candidate.name.to_lowercase() {
            return false;
        }
        let same_locality = match (&self.is_in, candidate.qualified_is_in()) {
            (Some(ours), Some(theirs)) => ours.to_lowercase() == theirs.to_lowercase(),
            _ => false,
        };
        same_locality && Haversine.distance(self.location, candidate.location()) <= max_distance_m
    }
}

/// One run of adjacent candidates describing the same physical street.
#[derive(Debug)]
struct Segment {
    last: StreetKey,
    /// The head address, or the address that resolved the house number exactly
    address: Address,
    resolved: bool,
}

#[derive(Debug)]
enum SegmentState {
    NoStreet,
    InStreet(Segment),
}

/// Folds a ranked candidate list into addresses, one per street segment and one per
/// other candidate.
pub(super) struct SegmentReducer<'r, 'a> {
    assembler: &'r AddressAssembler<'a>,
    house_number: Option<&'r str>,
    country_hint: Option<&'r str>,
    state: SegmentState,
    emitted: Vec<Address>,
}

impl<'r, 'a> SegmentReducer<'r, 'a> {
    pub(super) fn new(
        assembler: &'r AddressAssembler<'a>,
        house_number: Option<&'r str>,
        country_hint: Option<&'r str>,
    ) -> Self {
        Self {
            assembler,
            house_number,
            country_hint,
            state: SegmentState::NoStreet,
            emitted: Vec::new(),
        }
    }

    pub(super) fn step(&mut self, candidate: &CandidateRecord) {
        if !candidate.is_street() || candidate.name.trim().is_empty() {
            self.close_segment();
            let address = self
                .assembler
                .standalone_address(candidate, self.house_number, self.country_hint);
            self.emitted.push(address);
            return;
        }

        let max_distance = self.assembler.config.same_street_max_distance_m;
        if let SegmentState::InStreet(segment) = &mut self.state {
            if segment.last.continues(candidate, max_distance) {
                segment.last = StreetKey::of(candidate);
                if !segment.resolved {
                    if let Some(house_number) = self.house_number {
                        let (address, exact) =
                            self.assembler
                                .street_address(candidate, Some(house_number), self.country_hint);
                        if exact {
                            segment.address = address;
                            segment.resolved = true;
                        }
                    }
                }
                return;
            }
        }

        self.close_segment();
        let (address, resolved) =
            self.assembler
                .street_address(candidate, self.house_number, self.country_hint);
        self.state = SegmentState::InStreet(Segment {
            last: StreetKey::of(candidate),
            address,
            resolved,
        });
    }

    fn close_segment(&mut self) {
        if let SegmentState::InStreet(segment) = std::mem::replace(&mut self.state, SegmentState::NoStreet) {
            self.emitted.push(segment.address);
        }
    }

    pub(super) fn finish(mut self) -> Vec<Address> {
        self.close_segment();
        self.emitted
    }
}
