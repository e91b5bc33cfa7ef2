mod recurring_series;
