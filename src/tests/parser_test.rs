use super::super::{
    execution_list::{ExecutionListConfig, DEFAULT_CALIBRATION_FACTOR},
    execution_list_parser::{load_execution_list, parse_execution_list,
                            read_execution_list},
    path_command::PathCommand,
    settings::{LaserPulses, ScannerDelays, SkyWritingParams, WobbelMode},
};
use std::io::Write;

const CUT: &str = "\
// laserDESK execution list export
Calibration Factor: 26000.5
n_set_scanner_delays(1, 30, 12, 6);
n_set_mark_speed(1, 271.68);
n_set_jump_speed(1, 2716.8);
n_set_laser_pulses(1, 64, 10);
n_set_firstpulse_killer_list(1, 20);
n_set_angle_list(1, 1, 90.0, 1);
n_activate_scanahead_autodelays(1, 0);
n_set_scanahead_laser_shifts_list(1, -5, 3);
n_set_scanahead_line_params_list(1, 95.0, 90.0, 80.0);
n_set_wobbel_mode(1, 250, 125, 150.0, 1);
n_set_sky_writing_para_list(1, 0.5, -20, 10, 12);
n_set_sky_writing_mode_list(1, 3);
n_jump_abs(1, -3300, 3300);
n_mark_abs(1, 0, 1650);
n_arc_abs(1, 0, -1650, -180.0);  // half circle
n_mark_abs(1, -3300, -3300);
n_set_end_of_list(1);
";

#[test]
fn test_single_mark() {
    let list = parse_execution_list("n_mark_abs(1, 100, -50)");
    assert_eq!(list.commands, vec![PathCommand::line(100, -50)]);
    assert_eq!(list.config, ExecutionListConfig::default());
    assert!(list.skipped.is_empty());
}

#[test]
fn test_last_write_wins() {
    let list = parse_execution_list("n_set_mark_speed(1, 271.68)\n\
                                     n_set_mark_speed(1, 300.0)\n");
    assert_relative_eq!(list.config.mark_speed, 300.0);
    assert!(list.commands.is_empty());
}

#[test]
fn test_full_cut() {
    let list = parse_execution_list(CUT);
    assert!(list.skipped.is_empty(), "{:?}", list.skipped);
    let c = &list.config;
    assert_relative_eq!(c.calibration_factor, 26000.5);
    assert_eq!(c.scanner_delays, ScannerDelays {jump: 30, mark: 12, polygon: 6});
    assert_relative_eq!(c.mark_speed, 271.68);
    assert_relative_eq!(c.jump_speed, 2716.8);
    assert_eq!(c.laser_pulses, LaserPulses {half_period: 64, pulse_length: 10});
    assert_eq!(c.first_pulse_killer, 20);
    assert_relative_eq!(c.beam_angle, 90.0);
    assert!(!c.scanahead_autodelays);
    assert_eq!(c.scanahead_laser_shifts.laser_on, -5);
    assert_eq!(c.scanahead_laser_shifts.laser_off, 3);
    assert_relative_eq!(c.scanahead_line_params.acc_scale, 80.0);
    assert_eq!(c.wobbel_mode, WobbelMode {transversal: 250, longitudinal: 125,
                                          freq: 150.0, mode: 1});
    assert_eq!(c.sky_writing_params, SkyWritingParams {timelag: 0.5,
                                                       laser_on_shift: -20,
                                                       nprev: 10, npost: 12});
    assert_eq!(c.sky_writing_mode, 3);
    assert_eq!(list.commands,
               vec![PathCommand::jump(-3300, 3300),
                    PathCommand::line(0, 1650),
                    PathCommand::arc(0, -1650, -180.0),
                    PathCommand::line(-3300, -3300)]);
}

#[test]
fn test_defaults_without_marker() {
    let list = parse_execution_list("just some text\nwithout statements\n");
    assert!(list.commands.is_empty());
    assert!(list.skipped.is_empty());
    assert_relative_eq!(list.config.calibration_factor, DEFAULT_CALIBRATION_FACTOR);
}

#[test]
fn test_bad_statement_keeps_previous_value() {
    let list = parse_execution_list("n_set_mark_speed(1, 271.68)\n\
                                     n_set_mark_speed(1, fast)\n\
                                     n_set_laser_pulses(1, 40)\n\
                                     n_mark_abs(1, 10\n\
                                     n_jump_abs(1, 5, 6)\n");
    assert_relative_eq!(list.config.mark_speed, 271.68);
    assert_eq!(list.config.laser_pulses, ExecutionListConfig::default().laser_pulses);
    assert_eq!(list.commands, vec![PathCommand::jump(5, 6)]);
    let lines: Vec<usize> = list.skipped.iter().map(|s| s.line).collect();
    assert_eq!(lines, vec![2, 3, 4]);
    assert_eq!(list.skipped[1].statement, "n_set_laser_pulses");
}

#[test]
fn test_statements_without_card_prefix() {
    let list = parse_execution_list("set_jump_speed(500); jump_abs(1, 2); mark_abs(3, 4);");
    assert_relative_eq!(list.config.jump_speed, 500.0);
    assert_eq!(list.commands, vec![PathCommand::jump(1, 2), PathCommand::line(3, 4)]);
}

#[test]
fn test_fractional_coordinate_skipped() {
    let list = parse_execution_list("n_mark_abs(1, 10.5, 3)\nn_mark_abs(1, 10.0, 3)");
    assert_eq!(list.commands, vec![PathCommand::line(10, 3)]);
    assert_eq!(list.skipped.len(), 1);
}

#[test]
fn test_commented_out_statement_ignored() {
    let list = parse_execution_list("// n_mark_abs(1, 100, -50)\nn_get_status(1)\n");
    assert!(list.commands.is_empty());
    assert!(list.skipped.is_empty());
}

#[test]
fn test_calibration_in_comment_header() {
    let list = parse_execution_list("// Calibration Factor: 26000.5\n\
                                     n_mark_abs(1, 100, -50)\n");
    assert_relative_eq!(list.config.calibration_factor, 26000.5);
    assert_eq!(list.commands, vec![PathCommand::line(100, -50)]);
    assert!(list.skipped.is_empty());
}

#[test]
fn test_read_errors() {
    let invalid_utf8: &[u8] = &[0x6e, 0xff, 0xfe];
    assert!(read_execution_list(invalid_utf8).is_err());
    assert!(load_execution_list(std::path::Path::new("/nonexistent/cut.txt")).is_err());
}

#[test]
fn test_load_from_file() {
    let path = std::env::temp_dir().join(format!("rtc_paths_cut_{}.txt",
                                                 std::process::id()));
    {
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(CUT.as_bytes()).unwrap();
    }
    let list = load_execution_list(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(list.commands.len(), 4);
}
