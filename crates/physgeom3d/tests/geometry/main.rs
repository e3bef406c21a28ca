#[macro_use]
extern crate approx;

mod boxification;
mod contact_borders;
mod cube_end_to_end;
mod reference_counting;
mod subtraction_lineage;
mod trimesh_topology;
