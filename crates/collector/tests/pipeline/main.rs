mod helpers;
mod station_runs;
