// Business logic services layer
//
// The submission workflow lives here; it only talks to the outside world
// through the collaborator traits in `submission::ports`.

pub mod submission;
