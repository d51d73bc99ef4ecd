mod test_send_rejected_when_not_open;
