use super::super::{
    coords::CoordinateTransform,
    device::{DeviceCall, RecordingSink},
    error::Error,
    execution_list::ExecutionListConfig,
    execution_list_parser::parse_execution_list,
    list_protocol::{ListConfig, ListProtocolDriver, ListSession},
    path_command::{PathCommand, Shape},
    shape_compiler::{compile_shape, ShapeElement},
    shapes,
};

fn triangle() -> Shape {
    let elements = [ShapeElement::jump(-100.0, 100.0),
                    ShapeElement::line(0.0, 50.0),
                    ShapeElement::line(0.0, -50.0)];
    compile_shape(&elements, &CoordinateTransform::identity()).unwrap()
}

#[test]
fn test_submit_before_begin() {
    let mut sink = RecordingSink::new();
    {
        let mut driver = ListProtocolDriver::new(&mut sink);
        match driver.submit(&PathCommand::jump(0, 0)) {
            Err(Error::ProtocolViolation {operation, state}) => {
                assert_eq!(operation, "submit");
                assert_eq!(state, ListSession::Idle);
            }
            other => panic!("unexpected {:?}", other)
        }
        assert!(driver.end_load().is_err());
        assert!(driver.execute().is_err());
    }
    assert!(sink.calls().is_empty());
}

#[test]
fn test_session_order() {
    let mut driver = ListProtocolDriver::new(RecordingSink::new());
    driver.begin_load().unwrap();
    assert_eq!(driver.state(), ListSession::Loading);
    for cmd in &triangle() {
        driver.submit(cmd).unwrap();
    }
    driver.end_load().unwrap();
    assert_eq!(driver.state(), ListSession::Loaded);
    driver.execute().unwrap();
    assert_eq!(driver.state(), ListSession::Idle);

    let list = ListConfig::default();
    assert_eq!(driver.sink().calls(),
               &[DeviceCall::ConfigListMemory(list.list_memory, list.list_id),
                 DeviceCall::InitListLoading(list.list_id),
                 DeviceCall::AddJumpTo(-100, 100),
                 DeviceCall::AddLineTo(0, 50),
                 DeviceCall::AddLineTo(0, -50),
                 DeviceCall::SetEndOfList,
                 DeviceCall::ExecuteList(list.list_id)]);
}

#[test]
fn test_wrong_state_transitions() {
    let mut driver = ListProtocolDriver::new(RecordingSink::new());
    driver.begin_load().unwrap();
    assert!(matches!(driver.begin_load(), Err(Error::ProtocolViolation {..})));
    assert!(matches!(driver.execute(), Err(Error::ProtocolViolation {..})));
    assert!(matches!(driver.apply_config(&ExecutionListConfig::default()),
                     Err(Error::ProtocolViolation {..})));
    driver.end_load().unwrap();
    assert!(matches!(driver.submit(&PathCommand::line(1, 1)),
                     Err(Error::ProtocolViolation {state: ListSession::Loaded, ..})));
    assert!(matches!(driver.begin_load(), Err(Error::ProtocolViolation {..})));
    // Only the successful calls reached the card
    assert_eq!(driver.sink().calls().len(), 3);
}

#[test]
fn test_run_applies_config_first() {
    let mut driver = ListProtocolDriver::new(RecordingSink::new());
    let config = ExecutionListConfig::default();
    driver.run(&config, &triangle()).unwrap();
    let calls = driver.into_sink().take_calls();
    assert_eq!(calls[0], DeviceCall::SetScannerDelays(25, 10, 5));
    assert!(calls.contains(&DeviceCall::SetMarkSpeed(config.mark_speed)));
    let first_list = calls.iter()
        .position(|c| matches!(c, DeviceCall::ConfigListMemory(..))).unwrap();
    assert!(calls[..first_list].iter().all(|c| !c.is_list_command()));
    let adds: Vec<&DeviceCall> = calls.iter().filter(|c| c.is_list_command()).collect();
    assert_eq!(adds.len(), 3);
    assert_eq!(calls.last(), Some(&DeviceCall::ExecuteList(1)));
}

#[test]
fn test_every_run_reapplies_config() {
    let mut driver = ListProtocolDriver::new(RecordingSink::new());
    let config = ExecutionListConfig::default();
    driver.run(&config, &triangle()).unwrap();
    let home = compile_shape(&shapes::home(), &CoordinateTransform::identity()).unwrap();
    driver.run(&config, &home).unwrap();
    let calls = driver.sink().calls();
    let speeds = calls.iter()
        .filter(|c| matches!(c, DeviceCall::SetJumpSpeed(_))).count();
    assert_eq!(speeds, 2);
    assert!(calls.contains(&DeviceCall::AddJumpTo(0, 0)));
}

#[test]
fn test_parsed_list_runs_in_file_order() {
    let list = parse_execution_list("n_set_mark_speed(1, 300.0)\n\
                                     n_jump_abs(1, 1, 2)\n\
                                     n_arc_abs(1, 3, 4, 90.0)\n\
                                     n_mark_abs(1, 5, 6)\n");
    let shape = Shape::new(list.commands).unwrap();
    let mut driver = ListProtocolDriver::new(RecordingSink::new());
    driver.run(&list.config, &shape).unwrap();
    let calls = driver.sink().calls();
    assert!(calls.contains(&DeviceCall::SetMarkSpeed(300.0)));
    let adds: Vec<DeviceCall> = calls.iter().filter(|c| c.is_list_command())
        .cloned().collect();
    assert_eq!(adds, vec![DeviceCall::AddJumpTo(1, 2),
                          DeviceCall::AddArcTo(3, 4, 90.0),
                          DeviceCall::AddLineTo(5, 6)]);
}

#[test]
fn test_shape_too_large_for_list() {
    let list = ListConfig {list_id: 2, list_memory: 3};
    let mut driver = ListProtocolDriver::with_list_config(RecordingSink::new(), list);
    assert_eq!(driver.list_config().capacity(), 2);
    let result = driver.run(&ExecutionListConfig::default(), &triangle());
    assert!(matches!(result, Err(Error::InvalidShape(_))));
    assert!(driver.sink().calls().is_empty());
    assert_eq!(driver.state(), ListSession::Idle);
}

#[test]
fn test_device_failure_keeps_state() {
    // Calls 0 and 1 open the list, call 3 is the second add
    let mut driver = ListProtocolDriver::new(RecordingSink::failing_at(3));
    driver.begin_load().unwrap();
    let shape = triangle();
    driver.submit(&shape[0]).unwrap();
    match driver.submit(&shape[1]) {
        Err(Error::DeviceIo(e)) => assert!(e.to_string().contains("add_line_to")),
        other => panic!("unexpected {:?}", other)
    }
    assert_eq!(driver.state(), ListSession::Loading);
    driver.submit(&shape[1]).unwrap();
    driver.end_load().unwrap();
    driver.execute().unwrap();
}

#[test]
fn test_failed_begin_stays_idle() {
    let mut driver = ListProtocolDriver::new(RecordingSink::failing_at(1));
    assert!(matches!(driver.begin_load(), Err(Error::DeviceIo(_))));
    assert_eq!(driver.state(), ListSession::Idle);
}
